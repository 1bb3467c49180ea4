//! Project storage abstraction.
//!
//! The [`ProjectStore`] trait is the interface of the local project cache.
//! Only the persistence actor writes through it during a session; the CLI
//! uses `list` and `delete` for cache maintenance.

use super::StorageError;
use chrono::{DateTime, Utc};
use relabel_event::Project;
use relabel_types::ProjectId;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Format version written by this build.
pub const FORMAT_VERSION: u32 = 1;

/// Local project cache.
///
/// Implementations must be thread-safe: calls run on spawned tasks.
pub trait ProjectStore: Send + Sync + 'static {
    /// Prepares the store for use (creates directories, opens handles).
    fn open(&self) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Reads the stored copy of `id`, `None` if there is none.
    fn get(
        &self,
        id: &ProjectId,
    ) -> impl Future<Output = Result<Option<Project>, StorageError>> + Send;

    /// Writes `project` as the stored copy of `id`, replacing any previous one.
    fn put(
        &self,
        id: &ProjectId,
        project: &Project,
    ) -> impl Future<Output = Result<(), StorageError>> + Send;

    /// Lists stored projects, most recently saved first.
    fn list(&self) -> impl Future<Output = Result<Vec<ProjectMeta>, StorageError>> + Send;

    /// Removes the stored copy of `id`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if there is none.
    fn delete(&self, id: &ProjectId) -> impl Future<Output = Result<(), StorageError>> + Send;
}

/// Stored document: one project plus bookkeeping.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredProject {
    /// Format version.
    pub version: u32,
    /// Project id.
    pub id: ProjectId,
    /// Time of the write.
    pub saved_at: DateTime<Utc>,
    /// Project contents.
    pub project: Project,
}

impl StoredProject {
    /// Wraps `project` with the current time and format version.
    #[must_use]
    pub fn new(id: ProjectId, project: Project) -> Self {
        Self {
            version: FORMAT_VERSION,
            id,
            saved_at: Utc::now(),
            project,
        }
    }

    /// Rejects documents from a newer format.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::VersionIncompatible`] if `version` is newer
    /// than [`FORMAT_VERSION`].
    pub fn check_version(&self) -> Result<(), StorageError> {
        if self.version > FORMAT_VERSION {
            return Err(StorageError::VersionIncompatible {
                file_version: self.version,
                supported_version: FORMAT_VERSION,
            });
        }
        Ok(())
    }
}

/// Listing entry for a stored project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMeta {
    /// Project id.
    pub id: ProjectId,
    /// Time of the last write.
    pub saved_at: DateTime<Utc>,
    /// Number of frames.
    pub frames: usize,
    /// Number of cells in the lineage.
    pub cells: usize,
    /// Size of the stored document in bytes.
    pub size_bytes: u64,
}

impl ProjectMeta {
    /// Summarizes `stored`, whose encoded form is `size_bytes` long.
    #[must_use]
    pub fn from_stored(stored: &StoredProject, size_bytes: u64) -> Self {
        Self {
            id: stored.id.clone(),
            saved_at: stored.saved_at,
            frames: stored.project.frames(),
            cells: stored.project.lineage.len(),
            size_bytes,
        }
    }
}
