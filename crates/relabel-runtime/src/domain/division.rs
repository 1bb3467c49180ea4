//! Division editor: the click protocol for adding daughters.
//!
//! ```text
//!            ADD_DAUGHTER_MODE{parent}
//!   ┌──────┐ ────────────────────────► ┌────────────────┐
//!   │ Idle │                           │ AddingDaughter │ ◄─┐ CLICK (cycle / pick)
//!   └──────┘ ◄──────────────────────── └────────────────┘ ──┘
//!      │      RESET, or plain CLICK on the pending daughter
//!      │      (→ ADD_DAUGHTER{parent, daughter, t})
//!      └── CLICK on a hovered cell → SELECT{cell}
//! ```

use relabel_actor::{Actor, ActorRef, Context, Input};
use relabel_event::Message;
use relabel_types::CellId;
use std::collections::BTreeSet;
use std::ops::Bound;
use tracing::debug;

/// Division editor state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DivisionState {
    /// Clicks select cells.
    Idle,
    /// Clicks pick a daughter for `parent`.
    AddingDaughter {
        /// Dividing cell.
        parent: CellId,
        /// Candidate awaiting confirmation.
        pending: Option<CellId>,
    },
}

/// Turns canvas clicks into selection and division requests.
#[derive(Debug)]
pub struct DivisionEditor {
    selection: ActorRef,
    divisions: ActorRef,
    state: DivisionState,
    hovering: BTreeSet<CellId>,
    t: usize,
}

impl DivisionEditor {
    /// Creates an editor sending `SELECT` to `selection` and
    /// `ADD_DAUGHTER` to `divisions`.
    #[must_use]
    pub fn new(selection: ActorRef, divisions: ActorRef) -> Self {
        Self {
            selection,
            divisions,
            state: DivisionState::Idle,
            hovering: BTreeSet::new(),
            t: 0,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> DivisionState {
        self.state
    }

    fn cycle(&self, pending: Option<CellId>) -> Option<CellId> {
        pending
            .filter(|p| self.hovering.contains(p))
            .and_then(|p| {
                self.hovering
                    .range((Bound::Excluded(p), Bound::Unbounded))
                    .next()
                    .copied()
            })
            .or_else(|| self.hovering.first().copied())
    }

    fn click(&mut self, modified: bool, ctx: &Context<()>) {
        let Some(first) = self.hovering.first().copied() else {
            debug!(state = ?self.state, "click on empty space");
            return;
        };
        self.state = match self.state {
            DivisionState::Idle => {
                ctx.send(&self.selection, Message::Select { cell: first });
                DivisionState::Idle
            }
            DivisionState::AddingDaughter { parent, pending } if modified => {
                DivisionState::AddingDaughter {
                    parent,
                    pending: self.cycle(pending),
                }
            }
            DivisionState::AddingDaughter {
                parent,
                pending: Some(daughter),
            } if self.hovering.contains(&daughter) => {
                ctx.send(
                    &self.divisions,
                    Message::AddDaughter {
                        parent,
                        daughter,
                        t: self.t,
                    },
                );
                DivisionState::Idle
            }
            DivisionState::AddingDaughter { parent, .. } => DivisionState::AddingDaughter {
                parent,
                pending: Some(first),
            },
        };
    }
}

impl Actor for DivisionEditor {
    type Output = ();

    fn handle(&mut self, input: Input<()>, ctx: &mut Context<()>) {
        let Input::Message(delivery) = input else {
            return;
        };
        match delivery.message {
            Message::Hovering { hovering } => self.hovering = hovering,
            Message::SetFrame { t } => self.t = t,
            Message::AddDaughterMode { parent } => {
                self.state = DivisionState::AddingDaughter {
                    parent,
                    pending: None,
                };
            }
            Message::Reset => self.state = DivisionState::Idle,
            Message::Click { modified } => self.click(modified, ctx),
            _ => {}
        }
    }
}
