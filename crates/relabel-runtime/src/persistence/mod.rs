//! Local project cache.
//!
//! - [`ProjectStore`]: storage interface
//! - [`LocalFileStore`]: one JSON document per project on disk
//! - [`MemoryStore`]: in-memory store with failure injection
//! - [`PersistenceActor`]: single writer that mirrors the authoritative
//!   project into a store

mod actor;
mod error;
mod local;
mod memory;
mod store;

pub use actor::{PersistenceActor, PersistenceState, StoreOutcome};
pub use error::StorageError;
pub use local::{default_store_path, LocalFileStore};
pub use memory::MemoryStore;
pub use store::{ProjectMeta, ProjectStore, StoredProject, FORMAT_VERSION};
