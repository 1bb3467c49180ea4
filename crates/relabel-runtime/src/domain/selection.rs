//! Selection and lineage navigation.
//!
//! `NEXT_CELL`/`PREV_CELL` walk the lineage's cell ids in numeric order,
//! wrapping at either end. With nothing selected, `NEXT_CELL` picks the
//! smallest id and `PREV_CELL` the largest.

use relabel_actor::{answer_history, Actor, Context, Input, Snapshottable};
use relabel_event::{EventError, Lineage, Message, Snapshot};
use relabel_types::{BusId, CellId};
use std::collections::BTreeSet;
use std::ops::Bound;

/// Holds the selected cell and publishes `SELECTED` on change.
#[derive(Debug)]
pub struct SelectionActor {
    out: BusId,
    lineage: Lineage,
    selected: Option<CellId>,
    hovering: BTreeSet<CellId>,
}

impl SelectionActor {
    /// Creates the actor, publishing on `out`.
    #[must_use]
    pub fn new(out: BusId) -> Self {
        Self {
            out,
            lineage: Lineage::new(),
            selected: None,
            hovering: BTreeSet::new(),
        }
    }

    /// Selected cell.
    #[must_use]
    pub fn selected(&self) -> Option<CellId> {
        self.selected
    }

    /// Cells currently hovered.
    #[must_use]
    pub fn hovering(&self) -> &BTreeSet<CellId> {
        &self.hovering
    }

    fn next(&self) -> Option<CellId> {
        let mut ids = self.lineage.keys().copied();
        match self.selected {
            Some(cell) => self
                .lineage
                .range((Bound::Excluded(cell), Bound::Unbounded))
                .next()
                .map(|(id, _)| *id)
                .or_else(|| ids.next()),
            None => ids.next(),
        }
    }

    fn prev(&self) -> Option<CellId> {
        let mut ids = self.lineage.keys().copied();
        match self.selected {
            Some(cell) => self
                .lineage
                .range(..cell)
                .next_back()
                .map(|(id, _)| *id)
                .or_else(|| ids.next_back()),
            None => ids.next_back(),
        }
    }

    fn apply(&mut self, message: Message) {
        match message {
            Message::ProjectLoaded { project } => self.lineage = project.lineage.clone(),
            Message::Loaded { delta } => {
                if let Some(lineage) = delta.lineage {
                    self.lineage = lineage;
                }
            }
            Message::Hovering { hovering } => self.hovering = hovering,
            Message::SetCell { cell } | Message::Select { cell } => self.selected = Some(cell),
            Message::ResetCell => self.selected = None,
            Message::NextCell => {
                if let Some(cell) = self.next() {
                    self.selected = Some(cell);
                }
            }
            Message::PrevCell => {
                if let Some(cell) = self.prev() {
                    self.selected = Some(cell);
                }
            }
            _ => {}
        }
    }
}

impl Snapshottable for SelectionActor {
    fn snapshot(&self) -> Result<Snapshot, EventError> {
        Snapshot::new().with_field("selected", &self.selected)
    }

    fn restore(&mut self, snapshot: &Snapshot) -> Result<(), EventError> {
        self.selected = snapshot.field("selected")?;
        Ok(())
    }
}

impl Actor for SelectionActor {
    type Output = ();

    fn handle(&mut self, input: Input<()>, ctx: &mut Context<()>) {
        let Input::Message(delivery) = input else {
            return;
        };
        let before = self.selected;
        if !answer_history(self, &delivery, ctx) {
            self.apply(delivery.message);
        }
        if self.selected != before {
            ctx.publish(
                &self.out,
                Message::Selected {
                    selected: self.selected,
                },
            );
        }
    }
}
