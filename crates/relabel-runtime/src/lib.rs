//! relabel runtime: the actors behind a label-editing session.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  relabel-types  : ActorId, BusId, ProjectId, EditId, CellId  │
//! │  relabel-event  : Message, Snapshot, Project model           │
//! │  relabel-actor  : Actor trait, Context, test harness         │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Runtime Layer (THIS CRATE)                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  bus/runner      : EventBus, spawn_actor, ActorHandle        │
//! │  history/undo    : HistoryActor, LabelHistoryActor,          │
//! │                    UndoCoordinator                           │
//! │  api/            : ApiActor, LabelService                    │
//! │  domain/         : hovering, divisions, overlaps, selection  │
//! │  persistence/    : ProjectStore, PersistenceActor            │
//! │  config/         : RelabelConfig, ConfigLoader               │
//! │  workspace       : wiring for one project                    │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Frontend (relabel-cli)                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use relabel_runtime::api::HttpLabelService;
//! use relabel_runtime::persistence::LocalFileStore;
//! use relabel_runtime::{Workspace, WorkspaceOptions};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let service = HttpLabelService::new("http://127.0.0.1:5000", Duration::from_secs(30))?;
//! let store = LocalFileStore::new("~/.relabel/db", "relabel");
//! let workspace = Workspace::start(
//!     "embryo-3".parse()?,
//!     Arc::new(service),
//!     Arc::new(store),
//!     WorkspaceOptions::default(),
//! )?;
//! workspace.undo();
//! workspace.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod domain;
pub mod persistence;

mod bus;
mod history;
mod label_history;
mod runner;
mod undo;
mod workspace;

pub use bus::EventBus;
pub use history::{HistoryActor, HistoryState, DEFAULT_RESTORE_TIMEOUT};
pub use label_history::{Edit, LabelHistoryActor, LabelHistoryState};
pub use runner::{spawn_actor, ActorHandle};
pub use undo::{Progress, UndoCoordinator, UndoState};
pub use workspace::{Buses, Workspace, WorkspaceOptions};

pub use config::{ConfigError, ConfigLoader, ConfigResolver, NoOpResolver, RelabelConfig};
