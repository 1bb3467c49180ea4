//! Messages and data model for relabel.
//!
//! Actors in relabel share no memory; everything they know about each
//! other arrives as a [`Message`]. This crate defines:
//!
//! - [`Message`] / [`MessageKind`]: the closed message taxonomy
//! - [`Snapshot`]: opaque private state captured by history actors
//! - The project model ([`Project`], [`ProjectDelta`], [`Grid`],
//!   [`Overlaps`], [`Lineage`])
//! - [`EventError`]: data errors raised by the above
//!
//! # Message Flow
//!
//! ```text
//! user intent ──► EDIT ──► API actor ──► LOADING
//!                              │
//!                    ┌─────────┴─────────┐
//!                    ▼                   ▼
//!            LOADED{delta}         ERROR{message}
//!            EDITED{slice}               │
//!                    │                   ▼
//!                    ▼             REVERT_SAVE
//!       domain actors recompute
//!       persistence mirrors
//! ```

mod error;
mod message;
pub mod project;
mod snapshot;

pub use error::EventError;
pub use message::{Message, MessageKind};
pub use project::{
    divisions, Division, Grid, Labeled, Lineage, LineageEntry, Overlap, Overlaps, Project,
    ProjectDelta, Raw, Spot,
};
pub use snapshot::Snapshot;
