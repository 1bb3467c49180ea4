//! Core types for relabel.
//!
//! This crate provides the identifier types and the error-code convention
//! shared by every relabel crate.
//!
//! # Crate Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Message Layer                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  relabel-types   : IDs, ErrorCode               ◄── HERE     │
//! │  relabel-event   : Message, Snapshot, Project model         │
//! │  relabel-actor   : Actor trait, Context, ActorRef           │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Runtime Layer                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  relabel-runtime : EventBus, runner, API/history/domain     │
//! │                    actors, persistence, config              │
//! └─────────────────────────────────────────────────────────────┘
//!                               ↓
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Frontend Layer                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  relabel-cli     : Command-line interface                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Identifiers
//!
//! | Type | Meaning | Backing |
//! |------|---------|---------|
//! | [`ActorId`] | One running actor | name + UUID |
//! | [`BusId`] | A named publish/subscribe channel | name |
//! | [`ProjectId`] | A project on the label service | validated string |
//! | [`EditId`] | One label edit in the edit-keyed history | string |
//! | [`CellId`] | A cell (tracked object) in a label image | `u32` |
//!
//! # Example
//!
//! ```
//! use relabel_types::{ActorId, BusId, ProjectId, TryNew};
//!
//! // Well-known actors have deterministic UUIDs
//! assert_eq!(ActorId::named("api"), ActorId::named("api"));
//!
//! let bus = BusId::new("hovering");
//! assert_eq!(bus.to_string(), "bus:hovering");
//!
//! let project = ProjectId::try_new("Abc123".to_string()).unwrap();
//! assert_eq!(project.as_str(), "Abc123");
//! ```

mod construct;
mod error;
mod id;

pub use construct::TryNew;
pub use error::{assert_error_code, assert_error_codes, ErrorCode};
pub use id::{ActorId, BusId, CellId, EditId, InvalidProjectId, ProjectId};
