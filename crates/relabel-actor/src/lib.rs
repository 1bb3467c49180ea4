//! Actor model for relabel.
//!
//! Every stateful part of relabel (API client, histories, hovering,
//! selection, persistence) is an [`Actor`]: a synchronous state machine
//! that owns its state and talks to the rest of the system only through
//! messages.
//!
//! # Modules
//!
//! | Item | Purpose |
//! |------|---------|
//! | [`Actor`], [`Input`] | The state machine interface |
//! | [`Context`], [`Job`] | Effects requested by a handler |
//! | [`ActorRef`], [`Mailbox`] | Addressing and delivery |
//! | [`Snapshottable`], [`answer_history`] | Participation in undo/redo |
//! | [`ActorTestHarness`] | Deterministic unit testing |
//!
//! Running actors on tokio tasks and routing bus publications are the
//! job of `relabel-runtime`.

mod actor;
mod actor_ref;
mod context;
mod error;
mod snapshot;
pub mod testing;

pub use actor::{Actor, Input};
pub use actor_ref::{mailbox, ActorRef, Delivery, Mailbox};
pub use context::{BoxFuture, Context, Job, Publisher, TimerId};
pub use error::ActorError;
pub use snapshot::{answer_history, Snapshottable};
pub use testing::ActorTestHarness;
