//! Edit-keyed history.
//!
//! Unlike [`HistoryActor`](crate::HistoryActor), checkpoints are addressed
//! by [`EditId`] rather than position, so edits on unrelated labels can be
//! undone out of order.
//!
//! | Message (state `Idle`) | Guard | Effect |
//! |------------------------|-------|--------|
//! | `SNAPSHOT{edit, before, after}` | none | `past[edit] = {before, after}`, `future` cleared |
//! | `UNDO_EDIT{edit}` | `edit ∈ past` | target ← `before`, entry moves to `future` |
//! | `REDO_EDIT{edit}` | `edit ∈ future` | target ← `after`, entry moves to `past` |
//!
//! Restores wait for the target's `RESTORED` or the acknowledgment timer,
//! then report `RESTORED{edit}` to the owner. Clearing `future` forgets
//! those edits entirely.
//!
//! [`Workspace`](crate::Workspace) does not spawn this actor: its undo
//! stack is linear and the label service replays label edits itself. An
//! embedder with a `Snapshottable` label target and a source of `SNAPSHOT`
//! messages spawns it with [`spawn_actor`](crate::spawn_actor).

use crate::history::DEFAULT_RESTORE_TIMEOUT;
use relabel_actor::{Actor, ActorRef, Context, Delivery, Input, TimerId};
use relabel_event::{Message, Snapshot};
use relabel_types::EditId;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Before/after states of one edit.
#[derive(Debug, Clone, PartialEq)]
pub struct Edit {
    /// Target state before the edit.
    pub before: Snapshot,
    /// Target state after the edit.
    pub after: Snapshot,
}

/// Edit-keyed history state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelHistoryState {
    /// Accepting messages.
    Idle,
    /// Waiting for the target to adopt `before` of this edit.
    Undoing(EditId),
    /// Waiting for the target to adopt `after` of this edit.
    Redoing(EditId),
}

/// History keyed by edit id.
#[derive(Debug)]
pub struct LabelHistoryActor {
    target: ActorRef,
    owner: ActorRef,
    restore_timeout: Duration,
    state: LabelHistoryState,
    past: BTreeMap<EditId, Edit>,
    future: BTreeMap<EditId, Edit>,
    ack_timer: Option<TimerId>,
}

impl LabelHistoryActor {
    /// Creates a history for `target`, reporting to `owner`.
    #[must_use]
    pub fn new(target: ActorRef, owner: ActorRef) -> Self {
        Self {
            target,
            owner,
            restore_timeout: DEFAULT_RESTORE_TIMEOUT,
            state: LabelHistoryState::Idle,
            past: BTreeMap::new(),
            future: BTreeMap::new(),
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
    pub fn state(&self) -> &LabelHistoryState {
        &self.state
    }

    /// Applied edits.
    #[must_use]
    pub fn past(&self) -> &BTreeMap<EditId, Edit> {
        &self.past
    }

    /// Undone edits.
    #[must_use]
    pub fn future(&self) -> &BTreeMap<EditId, Edit> {
        &self.future
    }

    fn on_idle(&mut self, message: &Message, ctx: &mut Context<()>) {
        match message {
            Message::Snapshot {
                edit,
                before,
                after,
            } => {
                if !self.future.is_empty() {
                    debug!(dropped = self.future.len(), "redo entries cleared");
                    self.future.clear();
                }
                self.past.insert(
                    edit.clone(),
                    Edit {
                        before: before.clone(),
                        after: after.clone(),
                    },
                );
            }
            Message::UndoEdit { edit } => {
                let Some(entry) = self.past.remove(edit) else {
                    debug!(%edit, "not in past");
                    return;
                };
                let snapshot = entry.before.clone();
                self.future.insert(edit.clone(), entry);
                self.begin_restore(snapshot, LabelHistoryState::Undoing(edit.clone()), ctx);
            }
            Message::RedoEdit { edit } => {
                let Some(entry) = self.future.remove(edit) else {
                    debug!(%edit, "not in future");
                    return;
                };
                let snapshot = entry.after.clone();
                self.past.insert(edit.clone(), entry);
                self.begin_restore(snapshot, LabelHistoryState::Redoing(edit.clone()), ctx);
            }
            Message::Restored { .. } => debug!("late RESTORED ignored"),
            _ => {}
        }
    }

    fn begin_restore(&mut self, snapshot: Snapshot, state: LabelHistoryState, ctx: &mut Context<()>) {
        ctx.send(&self.target, Message::Restore { snapshot });
        self.ack_timer = Some(ctx.start_timer(self.restore_timeout));
        self.state = state;
    }

    fn finish_restore(&mut self, ctx: &mut Context<()>) {
        if let Some(timer) = self.ack_timer.take() {
            ctx.cancel_timer(timer);
        }
        let edit = match std::mem::replace(&mut self.state, LabelHistoryState::Idle) {
            LabelHistoryState::Undoing(edit) | LabelHistoryState::Redoing(edit) => Some(edit),
            LabelHistoryState::Idle => None,
        };
        ctx.send(&self.owner, Message::Restored { edit });
    }
}

impl Actor for LabelHistoryActor {
    type Output = ();

    fn handle(&mut self, input: Input<()>, ctx: &mut Context<()>) {
        match input {
            Input::Message(Delivery { message, .. }) => match (&self.state, &message) {
                (LabelHistoryState::Idle, _) => self.on_idle(&message, ctx),
                (_, Message::Restored { .. }) => self.finish_restore(ctx),
                (state, other) => {
                    debug!(?state, kind = %other.kind(), "not admitted");
                }
            },
            Input::Timer(id) if self.ack_timer == Some(id) => {
                warn!(state = ?self.state, "restore not acknowledged, assuming restored");
                self.ack_timer = None;
                self.finish_restore(ctx);
            }
            Input::Timer(_) | Input::Completed(()) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relabel_actor::{mailbox, ActorTestHarness, Mailbox};
    use relabel_types::ActorId;

    fn snap(v: i32) -> Snapshot {
        Snapshot::new().with_field("value", &v).unwrap()
    }

    fn record(h: &mut ActorTestHarness<LabelHistoryActor>, id: &str, before: i32, after: i32) {
        h.tell(Message::Snapshot {
            edit: EditId::new(id),
            before: snap(before),
            after: snap(after),
        });
    }

    fn rig() -> (ActorTestHarness<LabelHistoryActor>, Mailbox, Mailbox) {
        let (target, target_in) = mailbox(ActorId::new("target"));
        let (owner, owner_in) = mailbox(ActorId::new("owner"));
        (
            ActorTestHarness::new(LabelHistoryActor::new(target, owner)),
            target_in,
            owner_in,
        )
    }

    #[test]
    fn scenario_edit_keyed_undo_redo() {
        let (mut h, mut target, mut owner) = rig();
        let e1 = EditId::new("e1");
        record(&mut h, "e1", 1, 2);

        h.tell(Message::UndoEdit { edit: e1.clone() });
        assert_eq!(
            target.drain(),
            vec![Message::Restore { snapshot: snap(1) }]
        );
        assert!(h.actor().future().contains_key(&e1));
        assert!(!h.actor().past().contains_key(&e1));

        h.tell(Message::restored());
        assert_eq!(
            owner.drain(),
            vec![Message::Restored {
                edit: Some(e1.clone())
            }]
        );

        h.tell(Message::RedoEdit { edit: e1.clone() });
        assert_eq!(
            target.drain(),
            vec![Message::Restore { snapshot: snap(2) }]
        );
        assert!(h.actor().past().contains_key(&e1));
        assert!(!h.actor().future().contains_key(&e1));
    }

    #[test]
    fn independent_edits_undo_out_of_order() {
        let (mut h, mut target, _owner) = rig();
        record(&mut h, "a", 1, 2);
        record(&mut h, "b", 10, 20);

        h.tell(Message::UndoEdit {
            edit: EditId::new("a"),
        });
        h.tell(Message::restored());
        assert_eq!(
            target.drain(),
            vec![Message::Restore { snapshot: snap(1) }]
        );
        assert!(h.actor().past().contains_key(&EditId::new("b")));
    }

    #[test]
    fn unknown_edit_is_silent() {
        let (mut h, mut target, mut owner) = rig();
        h.tell(Message::UndoEdit {
            edit: EditId::new("ghost"),
        });
        h.tell(Message::RedoEdit {
            edit: EditId::new("ghost"),
        });
        assert!(target.drain().is_empty());
        assert!(owner.drain().is_empty());
        assert_eq!(h.actor().state(), &LabelHistoryState::Idle);
    }

    #[test]
    fn snapshot_clears_future() {
        let (mut h, _target, _owner) = rig();
        record(&mut h, "a", 1, 2);
        h.tell(Message::UndoEdit {
            edit: EditId::new("a"),
        });
        h.tell(Message::restored());
        record(&mut h, "b", 3, 4);
        assert!(h.actor().future().is_empty());
        assert_eq!(h.actor().past().len(), 1);
    }

    #[test]
    fn timeout_reports_edit() {
        let (mut h, _target, mut owner) = rig();
        record(&mut h, "a", 1, 2);
        h.tell(Message::UndoEdit {
            edit: EditId::new("a"),
        });
        record(&mut h, "ignored", 0, 0);
        assert!(!h.actor().past().contains_key(&EditId::new("ignored")));

        h.fire_all_timers();
        assert_eq!(
            owner.drain(),
            vec![Message::Restored {
                edit: Some(EditId::new("a"))
            }]
        );
        assert_eq!(h.actor().state(), &LabelHistoryState::Idle);

        h.tell(Message::restored());
        assert!(owner.drain().is_empty());
    }
}
