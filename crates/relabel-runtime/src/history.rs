//! Stack history: undo/redo over snapshots of one target actor.
//!
//! # State Machine
//!
//! ```text
//!             SAVE                   RESTORE{snapshot} from target
//!   ┌──────┐ ──────► ┌────────┐ ───────────────────────────────┐
//!   │      │         │ Saving │    past.push, future.clear,    │
//!   │      │ ◄────── └────────┘    owner ← SAVED               │
//!   │ Idle │ ◄──────────────────────────────────────────────────┘
//!   │      │  UNDO (past non-empty)   ┌───────────────┐
//!   │      │ ───────────────────────► │ RestoringPast │──┐
//!   │      │  REDO (future non-empty) ┌───────────────┐  │ RESTORED from target
//!   │      │ ───────────────────────► │RestoringFuture│──┤ or ack timer expiry
//!   └──────┘ ◄────────────────────────└───────────────┘◄─┘ owner ← RESTORED
//! ```
//!
//! `past.last()` is the most recent checkpoint. `UNDO` moves it to
//! `future` and restores the checkpoint beneath it; `REDO` moves the top of
//! `future` back and restores it.
//!
//! ```text
//! SAVE{0,0}  SAVE{1,1}   past=[{0,0},{1,1}]  future=[]
//! UNDO                   past=[{0,0}]        future=[{1,1}]  target ← {0,0}
//! REDO                   past=[{0,0},{1,1}]  future=[]       target ← {1,1}
//! ```

use relabel_actor::{Actor, ActorRef, Context, Delivery, Input, TimerId};
use relabel_event::{Message, Snapshot};
use std::time::Duration;
use tracing::{debug, warn};

/// Default restore acknowledgment window.
pub const DEFAULT_RESTORE_TIMEOUT: Duration = Duration::from_millis(500);

/// Stack history state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryState {
    /// Accepting `SAVE`, `UNDO`, `REDO`, `REVERT_SAVE`.
    Idle,
    /// Waiting for the target's snapshot.
    Saving,
    /// Waiting for the target to adopt an older snapshot.
    RestoringPast,
    /// Waiting for the target to adopt a newer snapshot.
    RestoringFuture,
}

/// Undo/redo stacks for one target actor.
///
/// The owner drives it with `SAVE`, `UNDO`, `REDO` and `REVERT_SAVE`, and
/// hears back `SAVED` and `RESTORED`.
#[derive(Debug)]
pub struct HistoryActor {
    target: ActorRef,
    owner: ActorRef,
    restore_timeout: Duration,
    state: HistoryState,
    past: Vec<Snapshot>,
    future: Vec<Snapshot>,
    ack_timer: Option<TimerId>,
}

impl HistoryActor {
    /// Creates a history for `target`, reporting to `owner`.
    #[must_use]
    pub fn new(target: ActorRef, owner: ActorRef) -> Self {
        Self {
            target,
            owner,
            restore_timeout: DEFAULT_RESTORE_TIMEOUT,
            state: HistoryState::Idle,
            past: Vec::new(),
            future: Vec::new(),
            ack_timer: None,
        }
    }

    /// Sets the restore acknowledgment window.
    #[must_use]
    pub fn with_restore_timeout(mut self, timeout: Duration) -> Self {
        self.restore_timeout = timeout;
        self
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> HistoryState {
        self.state
    }

    /// Saved checkpoints, oldest first.
    #[must_use]
    pub fn past(&self) -> &[Snapshot] {
        &self.past
    }

    /// Undone checkpoints; the next `REDO` takes the last one.
    #[must_use]
    pub fn future(&self) -> &[Snapshot] {
        &self.future
    }

    /// Number of saved checkpoints.
    #[must_use]
    pub fn past_len(&self) -> usize {
        self.past.len()
    }

    /// Number of redoable checkpoints.
    #[must_use]
    pub fn future_len(&self) -> usize {
        self.future.len()
    }

    fn on_idle(&mut self, message: &Message, ctx: &mut Context<()>) {
        match message {
            Message::Save => {
                ctx.send(&self.target, Message::Save);
                self.state = HistoryState::Saving;
            }
            Message::RevertSave => {
                if self.past.pop().is_some() {
                    debug!(actor = %self.target.id(), "dropped pending checkpoint");
                }
            }
            Message::Undo => {
                let Some(top) = self.past.pop() else {
                    debug!(actor = %self.target.id(), "nothing to undo");
                    return;
                };
                self.future.push(top);
                match self.past.last().cloned() {
                    Some(snapshot) => self.begin_restore(snapshot, HistoryState::RestoringPast, ctx),
                    None => ctx.send(&self.owner, Message::restored()),
                }
            }
            Message::Redo => {
                let Some(top) = self.future.pop() else {
                    debug!(actor = %self.target.id(), "nothing to redo");
                    return;
                };
                self.past.push(top.clone());
                self.begin_restore(top, HistoryState::RestoringFuture, ctx);
            }
            Message::Restored { .. } => {
                debug!(actor = %self.target.id(), "late RESTORED ignored");
            }
            _ => {}
        }
    }

    fn begin_restore(&mut self, snapshot: Snapshot, state: HistoryState, ctx: &mut Context<()>) {
        ctx.send(&self.target, Message::Restore { snapshot });
        self.ack_timer = Some(ctx.start_timer(self.restore_timeout));
        self.state = state;
    }

    fn finish_restore(&mut self, ctx: &mut Context<()>) {
        if let Some(timer) = self.ack_timer.take() {
            ctx.cancel_timer(timer);
        }
        self.state = HistoryState::Idle;
        ctx.send(&self.owner, Message::restored());
    }

    fn on_message(&mut self, delivery: &Delivery, ctx: &mut Context<()>) {
        match (self.state, &delivery.message) {
            (HistoryState::Idle, message) => self.on_idle(message, ctx),
            (HistoryState::Saving, Message::Restore { snapshot }) => {
                self.past.push(snapshot.clone());
                self.future.clear();
                self.state = HistoryState::Idle;
                ctx.send(&self.owner, Message::Saved);
            }
            (
                HistoryState::RestoringPast | HistoryState::RestoringFuture,
                Message::Restored { .. },
            ) => self.finish_restore(ctx),
            (state, message) => {
                debug!(
                    actor = %self.target.id(),
                    ?state,
                    kind = %message.kind(),
                    "not admitted"
                );
            }
        }
    }
}

impl Actor for HistoryActor {
    type Output = ();

    fn handle(&mut self, input: Input<()>, ctx: &mut Context<()>) {
        match input {
            Input::Message(delivery) => self.on_message(&delivery, ctx),
            Input::Timer(id) if self.ack_timer == Some(id) => {
                warn!(
                    actor = %self.target.id(),
                    timeout = ?self.restore_timeout,
                    "restore not acknowledged, assuming restored"
                );
                self.ack_timer = None;
                self.finish_restore(ctx);
            }
            Input::Timer(_) | Input::Completed(()) => {}
        }
    }
}
