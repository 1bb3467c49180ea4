//! Divisions: the division list, and the edit that adds a daughter.

use relabel_actor::{Actor, Context, Input};
use relabel_event::{divisions, Division, Message};
use relabel_types::BusId;
use std::collections::BTreeMap;
use tracing::debug;

/// Service action that records a daughter.
pub const ADD_DAUGHTER_ACTION: &str = "add_daughter";

/// Keeps the division list and requests `add_daughter` edits.
///
/// Requests go out as `EDIT` on the undo bus so they are checkpointed
/// like any other edit.
#[derive(Debug)]
pub struct DivisionsActor {
    edits: BusId,
    divisions: Vec<Division>,
}

impl DivisionsActor {
    /// Creates the actor, publishing edits on `edits`.
    #[must_use]
    pub fn new(edits: BusId) -> Self {
        Self {
            edits,
            divisions: Vec::new(),
        }
    }

    /// Known divisions, ordered by parent.
    #[must_use]
    pub fn divisions(&self) -> &[Division] {
        &self.divisions
    }
}

impl Actor for DivisionsActor {
    type Output = ();

    fn handle(&mut self, input: Input<()>, ctx: &mut Context<()>) {
        let Input::Message(delivery) = input else {
            return;
        };
        match delivery.message {
            Message::ProjectLoaded { project } => self.divisions = divisions(&project.lineage),
            Message::Loaded { delta } => {
                if let Some(lineage) = &delta.lineage {
                    self.divisions = divisions(lineage);
                }
            }
            Message::AddDaughter {
                parent,
                daughter,
                t,
            } => {
                debug!(%parent, %daughter, t, "requesting daughter");
                let args = BTreeMap::from([
                    ("parent".to_string(), parent.to_string()),
                    ("daughter".to_string(), daughter.to_string()),
                    ("t".to_string(), t.to_string()),
                ]);
                ctx.publish(
                    &self.edits,
                    Message::Edit {
                        action: ADD_DAUGHTER_ACTION.to_string(),
                        args,
                    },
                );
            }
            _ => {}
        }
    }
}
