//! Overlaps relay: holds the latest value → cell table and republishes it.

use relabel_actor::{Actor, Context, Input};
use relabel_event::{Message, Overlaps};
use relabel_types::BusId;
use std::sync::Arc;
use tracing::debug;

/// Relays the overlaps table on its own bus.
///
/// Silent until the first `PROJECT_LOADED` or `LOADED` carrying overlaps.
/// Afterwards every `EDITED` and `REFRESH` republishes the table.
#[derive(Debug)]
pub struct OverlapsActor {
    out: BusId,
    overlaps: Option<Arc<Overlaps>>,
}

impl OverlapsActor {
    /// Creates the relay, publishing on `out`.
    #[must_use]
    pub fn new(out: BusId) -> Self {
        Self { out, overlaps: None }
    }

    /// Current table, once loaded.
    #[must_use]
    pub fn overlaps(&self) -> Option<&Arc<Overlaps>> {
        self.overlaps.as_ref()
    }

    fn republish(&self, ctx: &Context<()>) {
        if let Some(overlaps) = &self.overlaps {
            ctx.publish(
                &self.out,
                Message::Overlaps {
                    overlaps: Arc::clone(overlaps),
                },
            );
        }
    }
}

impl Actor for OverlapsActor {
    type Output = ();

    fn handle(&mut self, input: Input<()>, ctx: &mut Context<()>) {
        let Input::Message(delivery) = input else {
            return;
        };
        match delivery.message {
            Message::ProjectLoaded { project } => {
                self.overlaps = Some(Arc::clone(&project.overlaps));
                self.republish(ctx);
            }
            Message::Loaded { delta } => {
                if let Some(overlaps) = delta.overlaps {
                    self.overlaps = Some(overlaps);
                    self.republish(ctx);
                }
            }
            Message::Edited { overlaps, .. } => {
                if self.overlaps.is_none() {
                    debug!("EDITED before initial load ignored");
                    return;
                }
                self.overlaps = Some(overlaps);
                self.republish(ctx);
            }
            Message::Refresh => self.republish(ctx),
            _ => {}
        }
    }
}
