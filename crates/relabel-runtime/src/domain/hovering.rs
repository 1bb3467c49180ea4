//! Hovering: the cells under the cursor.
//!
//! Recomputed on every dependency change, published only when the set
//! changes by value.
//!
//! | Input | Updates |
//! |-------|---------|
//! | `COORDINATES{x, y}` | cursor |
//! | `SET_FRAME{t}` | frame |
//! | `LABELED_ARRAY{frame, feature, labeled}` | displayed array |
//! | `OVERLAPS{overlaps}` | value → cell table |
//! | `EDITED{..}` | table, and the array if it is the one displayed |
//! | `PROJECT_LOADED{project}` | table, and the array for the current frame |

use relabel_actor::{Actor, Context, Input};
use relabel_event::{Grid, Message, Overlaps};
use relabel_types::{BusId, CellId};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::trace;

/// Derives `HOVERING{hovering}` from cursor, frame and label data.
#[derive(Debug)]
pub struct HoveringActor {
    out: BusId,
    cursor: Option<(i64, i64)>,
    t: usize,
    feature: usize,
    labeled: Option<(usize, Arc<Grid<i32>>)>,
    overlaps: Arc<Overlaps>,
    hovering: BTreeSet<CellId>,
}

impl HoveringActor {
    /// Creates the actor, publishing on `out`.
    #[must_use]
    pub fn new(out: BusId) -> Self {
        Self {
            out,
            cursor: None,
            t: 0,
            feature: 0,
            labeled: None,
            overlaps: Arc::new(Overlaps::default()),
            hovering: BTreeSet::new(),
        }
    }

    /// Last published set.
    #[must_use]
    pub fn hovering(&self) -> &BTreeSet<CellId> {
        &self.hovering
    }

    fn compute(&self) -> BTreeSet<CellId> {
        let (Some((x, y)), Some((_, labeled))) = (self.cursor, &self.labeled) else {
            return BTreeSet::new();
        };
        labeled
            .get(x, y)
            .map(|value| self.overlaps.cells_at(*value, self.t))
            .unwrap_or_default()
    }

    /// Applies `message`. Returns `false` if it is not a dependency.
    fn update(&mut self, message: Message) -> bool {
        match message {
            Message::Coordinates { x, y } => self.cursor = Some((x, y)),
            Message::SetFrame { t } => self.t = t,
            Message::LabeledArray {
                frame,
                feature,
                labeled,
            } => {
                self.feature = feature;
                self.labeled = Some((frame, labeled));
            }
            Message::Overlaps { overlaps } => self.overlaps = overlaps,
            Message::Edited {
                frame,
                feature,
                labeled,
                overlaps,
            } => {
                self.overlaps = overlaps;
                if feature == self.feature
                    && matches!(&self.labeled, Some((shown, _)) if *shown == frame)
                {
                    self.labeled = Some((frame, labeled));
                }
            }
            Message::Loaded { delta } => {
                if delta.overlaps.is_none() && delta.labeled.is_none() {
                    return false;
                }
                if let Some(overlaps) = delta.overlaps {
                    self.overlaps = overlaps;
                }
                let shown = delta
                    .labeled
                    .as_ref()
                    .and_then(|stack| stack.get(self.feature))
                    .and_then(|frames| frames.get(self.t));
                if let Some(labeled) = shown {
                    self.labeled = Some((self.t, Arc::clone(labeled)));
                }
            }
            Message::ProjectLoaded { project } => {
                self.overlaps = Arc::clone(&project.overlaps);
                if let Some(labeled) = project.labeled_at(self.t, self.feature) {
                    self.labeled = Some((self.t, Arc::clone(labeled)));
                }
            }
            _ => return false,
        }
        true
    }
}

impl Actor for HoveringActor {
    type Output = ();

    fn handle(&mut self, input: Input<()>, ctx: &mut Context<()>) {
        let Input::Message(delivery) = input else {
            return;
        };
        if !self.update(delivery.message) {
            return;
        }
        let next = self.compute();
        if next == self.hovering {
            trace!(cells = next.len(), "hovering unchanged");
            return;
        }
        self.hovering = next.clone();
        ctx.publish(&self.out, Message::Hovering { hovering: next });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relabel_actor::ActorTestHarness;
    use relabel_event::{Overlap, ProjectDelta};

    fn out() -> BusId {
        BusId::new("hover")
    }

    fn cells(ids: &[u32]) -> BTreeSet<CellId> {
        ids.iter().copied().map(CellId).collect()
    }

    /// 3x1 image: `[0, 1, 2]`; value 1 covers cell 10, value 2 covers
    /// cells 20 and 21 at frame 0 and cell 22 at frame 1.
    fn rig() -> ActorTestHarness<HoveringActor> {
        let mut h = ActorTestHarness::new(HoveringActor::new(out()));
        h.tell(Message::LabeledArray {
            frame: 0,
            feature: 0,
            labeled: Arc::new(Grid::from_rows(vec![vec![0, 1, 2]]).unwrap()),
        });
        h.tell(Message::Overlaps {
            overlaps: Arc::new(Overlaps::new(vec![
                Overlap { value: 1, cell: CellId(10), t: 0 },
                Overlap { value: 2, cell: CellId(20), t: 0 },
                Overlap { value: 2, cell: CellId(21), t: 0 },
                Overlap { value: 2, cell: CellId(22), t: 1 },
            ])),
        });
        h
    }

    fn published(h: &mut ActorTestHarness<HoveringActor>) -> Vec<BTreeSet<CellId>> {
        h.take_published_on(&out())
            .into_iter()
            .filter_map(|m| match m {
                Message::Hovering { hovering } => Some(hovering),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn publishes_cells_under_cursor() {
        let mut h = rig();
        h.tell(Message::Coordinates { x: 2, y: 0 });
        assert_eq!(published(&mut h), vec![cells(&[20, 21])]);
    }

    #[test]
    fn dedups_identical_sets() {
        let mut h = rig();
        h.tell(Message::Coordinates { x: 1, y: 0 });
        h.tell(Message::Coordinates { x: 1, y: 0 });
        h.tell(Message::Coordinates { x: 1, y: 0 });
        assert_eq!(published(&mut h), vec![cells(&[10])]);

        h.tell(Message::Coordinates { x: 2, y: 0 });
        h.tell(Message::Coordinates { x: 1, y: 0 });
        assert_eq!(published(&mut h), vec![cells(&[20, 21]), cells(&[10])]);
    }

    #[test]
    fn background_and_out_of_bounds_are_empty() {
        let mut h = rig();
        h.tell(Message::Coordinates { x: 0, y: 0 });
        h.tell(Message::Coordinates { x: -4, y: 9 });
        assert!(published(&mut h).is_empty());

        h.tell(Message::Coordinates { x: 1, y: 0 });
        h.tell(Message::Coordinates { x: 99, y: 0 });
        assert_eq!(published(&mut h), vec![cells(&[10]), cells(&[])]);
    }

    #[test]
    fn loaded_copy_supplies_array_and_overlaps() {
        let mut h = ActorTestHarness::new(HoveringActor::new(out()));
        h.tell(Message::Coordinates { x: 1, y: 0 });
        assert!(published(&mut h).is_empty());

        h.tell(Message::Loaded {
            delta: ProjectDelta {
                labeled: Some(vec![vec![Arc::new(
                    Grid::from_rows(vec![vec![0, 5]]).unwrap(),
                )]]),
                overlaps: Some(Arc::new(Overlaps::new(vec![Overlap {
                    value: 5,
                    cell: CellId(7),
                    t: 0,
                }]))),
                ..ProjectDelta::default()
            },
        });
        assert_eq!(published(&mut h), vec![cells(&[7])]);

        h.tell(Message::Loaded {
            delta: ProjectDelta::default(),
        });
        assert!(published(&mut h).is_empty());
    }

    #[test]
    fn frame_change_recomputes() {
        let mut h = rig();
        h.tell(Message::Coordinates { x: 2, y: 0 });
        h.tell(Message::SetFrame { t: 1 });
        assert_eq!(
            published(&mut h),
            vec![cells(&[20, 21]), cells(&[22])]
        );
    }

    #[test]
    fn edit_patches_displayed_array() {
        let mut h = rig();
        h.tell(Message::Coordinates { x: 0, y: 0 });
        h.tell(Message::Edited {
            frame: 0,
            feature: 0,
            labeled: Arc::new(Grid::from_rows(vec![vec![1, 1, 2]]).unwrap()),
            overlaps: Arc::new(Overlaps::new(vec![Overlap {
                value: 1,
                cell: CellId(10),
                t: 0,
            }])),
        });
        assert_eq!(published(&mut h), vec![cells(&[10])]);
    }

    #[test]
    fn edit_on_other_frame_keeps_array() {
        let mut h = rig();
        h.tell(Message::Coordinates { x: 0, y: 0 });
        h.tell(Message::Edited {
            frame: 3,
            feature: 0,
            labeled: Arc::new(Grid::filled(3, 1, 1)),
            overlaps: Arc::new(Overlaps::new(vec![Overlap {
                value: 1,
                cell: CellId(10),
                t: 0,
            }])),
        });
        assert!(published(&mut h).is_empty());
    }

    #[test]
    fn unrelated_messages_do_not_publish() {
        let mut h = rig();
        h.tell(Message::Coordinates { x: 1, y: 0 });
        h.take_published();
        h.tell(Message::NextCell);
        h.tell(Message::Loading);
        assert!(h.take_published().is_empty());
    }
}
