//! In-memory project store.

use super::{ProjectMeta, ProjectStore, StorageError, StoredProject};
use parking_lot::Mutex;
use relabel_event::Project;
use relabel_types::ProjectId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Project store held in memory.
///
/// Reads and writes can be made to fail, and writes are counted, so
/// persistence behavior can be checked without a filesystem.
#[derive(Debug, Default)]
pub struct MemoryStore {
    projects: Mutex<HashMap<ProjectId, StoredProject>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `project` as `id`.
    #[must_use]
    pub fn with_project(id: ProjectId, project: Project) -> Self {
        let store = Self::new();
        store
            .projects
            .lock()
            .insert(id.clone(), StoredProject::new(id, project));
        store
    }

    /// Makes `open` and `get` fail while set.
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes `put` and `delete` fail while set.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Stored copy of `id`.
    #[must_use]
    pub fn project(&self, id: &ProjectId) -> Option<Project> {
        self.projects.lock().get(id).map(|s| s.project.clone())
    }

    fn check(&self, flag: &AtomicBool, op: &str) -> Result<(), StorageError> {
        if flag.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable(format!("{op} disabled")));
        }
        Ok(())
    }
}

impl ProjectStore for MemoryStore {
    async fn open(&self) -> Result<(), StorageError> {
        self.check(&self.fail_reads, "open")
    }

    async fn get(&self, id: &ProjectId) -> Result<Option<Project>, StorageError> {
        self.check(&self.fail_reads, "get")?;
        Ok(self.project(id))
    }

    async fn put(&self, id: &ProjectId, project: &Project) -> Result<(), StorageError> {
        self.check(&self.fail_writes, "put")?;
        self.projects
            .lock()
            .insert(id.clone(), StoredProject::new(id.clone(), project.clone()));
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ProjectMeta>, StorageError> {
        let mut metas: Vec<_> = self
            .projects
            .lock()
            .values()
            .map(|stored| ProjectMeta::from_stored(stored, 0))
            .collect();
        metas.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        Ok(metas)
    }

    async fn delete(&self, id: &ProjectId) -> Result<(), StorageError> {
        self.check(&self.fail_writes, "delete")?;
        self.projects
            .lock()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| StorageError::not_found(id.as_str()))
    }
}
