//! Undo coordinator: owner of the history actors and gate of the API actor.
//!
//! Turns user `EDIT`/`UNDO`/`REDO` intents into the history protocol and
//! forwards the remote part to the API actor. `SET_DISPLAY_DIM` and
//! `TOGGLE_RGB` pass straight through. Every request of a workspace goes
//! through here, one at a time, so each `LOADED`/`ERROR` on the API bus
//! answers the request the coordinator forwarded last.
//!
//! ```text
//!  Starting ── PROJECT_LOADED | ERROR ──► Idle   (held intents replayed)
//!
//!  EDIT ──► Saving ── all SAVED ──► Editing ── LOADED ──► Idle (actions+1)
//!                  (EDIT → requests)        └─ ERROR ───► Idle, REVERT_SAVE → histories
//!
//!  UNDO ──► Undoing ── API outcome + all RESTORED ──► Idle (actions-1, redos+1)
//!  REDO ──► Redoing ── API outcome + all RESTORED ──► Idle (actions+1, redos-1)
//!
//!  SET_DISPLAY_DIM | TOGGLE_RGB ──► Forwarding ── LOADED | ERROR ──► Idle
//! ```
//!
//! Intents arriving before the first load resolves are held and replayed in
//! order. Intents arriving while a request is in flight are absorbed.

use relabel_actor::{Actor, ActorRef, Context, Delivery, Input};
use relabel_event::Message;
use relabel_types::BusId;
use std::collections::VecDeque;
use tracing::{debug, warn};

/// Undo coordinator state.
#[derive(Debug, Clone, PartialEq)]
pub enum UndoState {
    /// The API actor has not finished its first load.
    Starting,
    /// Accepting intents.
    Idle,
    /// Waiting for `SAVED` from `pending` histories before sending `edit`.
    Saving {
        /// The `EDIT` to forward.
        edit: Message,
        /// Histories yet to reply.
        pending: usize,
    },
    /// `EDIT` forwarded, waiting for the API outcome.
    Editing,
    /// A display request forwarded, waiting for the API outcome.
    Forwarding,
    /// `UNDO` forwarded.
    Undoing(Progress),
    /// `REDO` forwarded.
    Redoing(Progress),
}

/// Completion tracking for an undo or redo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// API outcome: `None` while in flight, then whether it succeeded.
    pub api: Option<bool>,
    /// Histories yet to reply `RESTORED`.
    pub pending: usize,
}

/// Sequences edits against the history actors and the API actor.
#[derive(Debug)]
pub struct UndoCoordinator {
    histories: Vec<ActorRef>,
    requests: BusId,
    state: UndoState,
    held: VecDeque<Message>,
    actions: usize,
    redos: usize,
}

impl UndoCoordinator {
    /// Creates a coordinator that forwards to the API actor on `requests`.
    ///
    /// It starts in [`UndoState::Starting`] and needs the API actor's
    /// `PROJECT_LOADED` (or first-load `ERROR`) before it forwards anything.
    #[must_use]
    pub fn new(histories: Vec<ActorRef>, requests: BusId) -> Self {
        Self {
            histories,
            requests,
            state: UndoState::Starting,
            held: VecDeque::new(),
            actions: 0,
            redos: 0,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &UndoState {
        &self.state
    }

    /// Number of undoable actions.
    #[must_use]
    pub fn actions(&self) -> usize {
        self.actions
    }

    /// Number of redoable actions.
    #[must_use]
    pub fn redos(&self) -> usize {
        self.redos
    }

    /// Intents held until the first load resolves.
    #[must_use]
    pub fn held(&self) -> usize {
        self.held.len()
    }

    fn tell_histories(&self, message: &Message, ctx: &Context<()>) {
        for history in &self.histories {
            ctx.send(history, message.clone());
        }
    }

    fn progress(&self) -> Progress {
        Progress {
            api: None,
            pending: self.histories.len(),
        }
    }

    fn on_starting(&mut self, message: Message) {
        match message {
            Message::ProjectLoaded { .. } => {
                debug!(held = self.held.len(), "project loaded, accepting intents");
                self.state = UndoState::Idle;
            }
            Message::Error { message } => {
                debug!(%message, held = self.held.len(), "first load failed, accepting intents");
                self.state = UndoState::Idle;
            }
            message if message.is_api_request() => {
                debug!(kind = %message.kind(), "intent held until the project is loaded");
                self.held.push_back(message);
            }
            _ => {}
        }
    }

    fn on_idle(&mut self, message: Message, ctx: &mut Context<()>) {
        match message {
            Message::Edit { .. } if self.histories.is_empty() => {
                ctx.publish(&self.requests, message);
                self.state = UndoState::Editing;
            }
            Message::Edit { .. } => {
                self.tell_histories(&Message::Save, ctx);
                self.state = UndoState::Saving {
                    edit: message,
                    pending: self.histories.len(),
                };
            }
            Message::Undo if self.actions > 0 => {
                ctx.publish(&self.requests, Message::Undo);
                self.tell_histories(&Message::Undo, ctx);
                self.state = UndoState::Undoing(self.progress());
            }
            Message::Redo if self.redos > 0 => {
                ctx.publish(&self.requests, Message::Redo);
                self.tell_histories(&Message::Redo, ctx);
                self.state = UndoState::Redoing(self.progress());
            }
            Message::Undo | Message::Redo => debug!(kind = %message.kind(), "nothing to do"),
            Message::SetDisplayDim { .. } | Message::ToggleRgb => {
                ctx.publish(&self.requests, message);
                self.state = UndoState::Forwarding;
            }
            _ => {}
        }
    }

    fn on_busy(&mut self, message: Message, ctx: &mut Context<()>) {
        let state = std::mem::replace(&mut self.state, UndoState::Idle);
        self.state = match (state, message) {
            (UndoState::Saving { edit, pending }, Message::Saved) => {
                if pending <= 1 {
                    ctx.publish(&self.requests, edit);
                    UndoState::Editing
                } else {
                    UndoState::Saving {
                        edit,
                        pending: pending - 1,
                    }
                }
            }
            (UndoState::Editing, Message::Loaded { .. }) => {
                self.actions += 1;
                self.redos = 0;
                UndoState::Idle
            }
            (UndoState::Editing, Message::Error { message }) => {
                debug!(%message, "edit failed, reverting checkpoints");
                self.tell_histories(&Message::RevertSave, ctx);
                UndoState::Idle
            }
            (UndoState::Forwarding, Message::Loaded { .. } | Message::Error { .. }) => {
                UndoState::Idle
            }
            (UndoState::Undoing(p), message) => match advance(p, &message) {
                Some(p) if p.api.is_some() && p.pending == 0 => {
                    if p.api == Some(true) {
                        self.actions -= 1;
                        self.redos += 1;
                    }
                    UndoState::Idle
                }
                Some(p) => UndoState::Undoing(p),
                None => UndoState::Undoing(p),
            },
            (UndoState::Redoing(p), message) => match advance(p, &message) {
                Some(p) if p.api.is_some() && p.pending == 0 => {
                    if p.api == Some(true) {
                        self.actions += 1;
                        self.redos -= 1;
                    }
                    UndoState::Idle
                }
                Some(p) => UndoState::Redoing(p),
                None => UndoState::Redoing(p),
            },
            (state, message) => {
                if message.is_api_request() {
                    debug!(?state, kind = %message.kind(), "intent absorbed");
                }
                state
            }
        };
    }
}

fn advance(mut p: Progress, message: &Message) -> Option<Progress> {
    match message {
        Message::Loaded { .. } => p.api = Some(true),
        Message::Error { message } => {
            warn!(%message, "remote undo/redo failed");
            p.api = Some(false);
        }
        Message::Restored { .. } => p.pending = p.pending.saturating_sub(1),
        _ => return None,
    }
    Some(p)
}

impl Actor for UndoCoordinator {
    type Output = ();

    fn handle(&mut self, input: Input<()>, ctx: &mut Context<()>) {
        let Input::Message(Delivery { message, .. }) = input else {
            return;
        };
        match self.state {
            UndoState::Starting => self.on_starting(message),
            UndoState::Idle => self.on_idle(message, ctx),
            _ => self.on_busy(message, ctx),
        }
        while self.state == UndoState::Idle {
            let Some(intent) = self.held.pop_front() else {
                break;
            };
            self.on_idle(intent, ctx);
        }
    }
}
