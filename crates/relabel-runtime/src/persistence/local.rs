//! File-backed project store.
//!
//! One JSON document per project:
//!
//! ```text
//! ~/.relabel/db/
//! └── relabel/              <- database
//!     └── projects/
//!         ├── embryo-3.json
//!         └── ...
//! ```

use super::{ProjectMeta, ProjectStore, StorageError, StoredProject};
use relabel_event::Project;
use relabel_types::ProjectId;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Project store in a local directory.
///
/// - Writes go to a temp file first, then rename over the target
/// - Directories are created by [`open`](ProjectStore::open)
/// - A leading `~/` in the root expands to the home directory
///
/// # Example
///
/// ```no_run
/// use relabel_runtime::persistence::{LocalFileStore, ProjectStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = LocalFileStore::new("~/.relabel/db", "relabel");
/// store.open().await?;
/// for meta in store.list().await? {
///     println!("{} ({} frames)", meta.id, meta.frames);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    dir: PathBuf,
}

impl LocalFileStore {
    /// Creates a store for `database` under `root`. Touches no files.
    #[must_use]
    pub fn new(root: impl AsRef<Path>, database: &str) -> Self {
        Self {
            dir: expand_tilde(root.as_ref()).join(database).join("projects"),
        }
    }

    /// Directory holding the project documents.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn project_path(&self, id: &ProjectId) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    fn temp_path(&self, id: &ProjectId) -> PathBuf {
        self.dir.join(format!(".{id}.json.tmp"))
    }
}

impl ProjectStore for LocalFileStore {
    async fn open(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| StorageError::directory_creation(&self.dir, e))
    }

    async fn get(&self, id: &ProjectId) -> Result<Option<Project>, StorageError> {
        let path = self.project_path(id);
        let json = match fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let stored: StoredProject = serde_json::from_str(&json)?;
        stored.check_version()?;
        Ok(Some(stored.project))
    }

    async fn put(&self, id: &ProjectId, project: &Project) -> Result<(), StorageError> {
        let stored = StoredProject::new(id.clone(), project.clone());
        let json = serde_json::to_vec(&stored)?;
        let temp = self.temp_path(id);
        fs::write(&temp, &json).await?;
        fs::rename(&temp, self.project_path(id)).await?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ProjectMeta>, StorageError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut projects = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension() != Some(OsStr::new("json")) {
                continue;
            }
            if path
                .file_name()
                .and_then(OsStr::to_str)
                .is_some_and(|n| n.starts_with('.'))
            {
                continue;
            }
            let Ok(json) = fs::read(&path).await else {
                continue;
            };
            if let Ok(stored) = serde_json::from_slice::<StoredProject>(&json) {
                projects.push(ProjectMeta::from_stored(&stored, json.len() as u64));
            }
        }

        projects.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        Ok(projects)
    }

    async fn delete(&self, id: &ProjectId) -> Result<(), StorageError> {
        match fs::remove_file(self.project_path(id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::not_found(id.as_str()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Expands a leading `~/` to the home directory.
fn expand_tilde(path: &Path) -> PathBuf {
    if let Some(rest) = path.to_str().and_then(|s| s.strip_prefix("~/")) {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}

/// Default store root: `~/.relabel/db`.
#[must_use]
pub fn default_store_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".relabel")
        .join("db")
}
