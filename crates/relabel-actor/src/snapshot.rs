//! Snapshot support for history-wrapped actors.
//!
//! An actor whose state can be undone implements [`Snapshottable`] and
//! routes history messages through [`answer_history`]:
//!
//! | Received | Reply to sender |
//! |----------|-----------------|
//! | `SAVE` | `RESTORE{snapshot}` with the current state |
//! | `RESTORE{snapshot}` | `RESTORED` after adopting the state |
//!
//! # Example
//!
//! ```
//! use relabel_actor::Snapshottable;
//! use relabel_event::{EventError, Snapshot};
//!
//! struct Frame {
//!     t: usize,
//! }
//!
//! impl Snapshottable for Frame {
//!     fn snapshot(&self) -> Result<Snapshot, EventError> {
//!         Snapshot::new().with_field("t", &self.t)
//!     }
//!
//!     fn restore(&mut self, snapshot: &Snapshot) -> Result<(), EventError> {
//!         self.t = snapshot.field("t")?;
//!         Ok(())
//!     }
//! }
//!
//! let mut frame = Frame { t: 3 };
//! let snap = frame.snapshot().unwrap();
//! frame.t = 9;
//! frame.restore(&snap).unwrap();
//! assert_eq!(frame.t, 3);
//! ```

use crate::{Context, Delivery};
use relabel_event::{EventError, Message, Snapshot};
use tracing::{debug, warn};

/// State that can be captured and restored by a history actor.
pub trait Snapshottable {
    /// Captures the current state.
    ///
    /// # Errors
    ///
    /// Returns [`EventError`] if a field cannot be serialized.
    fn snapshot(&self) -> Result<Snapshot, EventError>;

    /// Replaces the current state with `snapshot`.
    ///
    /// # Errors
    ///
    /// Returns [`EventError`] if `snapshot` lacks a field or a field has
    /// the wrong shape. The state must be unchanged on error.
    fn restore(&mut self, snapshot: &Snapshot) -> Result<(), EventError>;
}

/// Answers `SAVE` and `RESTORE` on behalf of `state`.
///
/// Returns `true` if `delivery` was a history message and has been
/// handled. Replies go to the delivery's sender; a history message with
/// no sender is handled but not answered.
///
/// A snapshot that fails to restore leaves the state unchanged and is
/// still acknowledged, so the history actor does not wait out its timer.
pub fn answer_history<S, T>(state: &mut S, delivery: &Delivery, ctx: &mut Context<T>) -> bool
where
    S: Snapshottable,
{
    match &delivery.message {
        Message::Save => {
            match state.snapshot() {
                Ok(snapshot) => reply(delivery, ctx, Message::Restore { snapshot }),
                Err(e) => warn!(actor = %ctx.me().id(), "snapshot failed: {e}"),
            }
            true
        }
        Message::Restore { snapshot } => {
            if let Err(e) = state.restore(snapshot) {
                warn!(actor = %ctx.me().id(), "restore failed: {e}");
            }
            reply(delivery, ctx, Message::restored());
            true
        }
        _ => false,
    }
}

fn reply<T>(delivery: &Delivery, ctx: &Context<T>, message: Message) {
    match &delivery.from {
        Some(to) => ctx.send(to, message),
        None => debug!(actor = %ctx.me().id(), kind = %message.kind(), "no sender to reply to"),
    }
}
