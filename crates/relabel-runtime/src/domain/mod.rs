//! Domain actors: derived views over project and cursor state.
//!
//! | Actor | Consumes | Produces |
//! |-------|----------|----------|
//! | [`HoveringActor`] | cursor, frame, labels, overlaps | `HOVERING` |
//! | [`DivisionEditor`] | `HOVERING`, `CLICK`, `ADD_DAUGHTER_MODE` | `SELECT`, `ADD_DAUGHTER` |
//! | [`DivisionsActor`] | lineage, `ADD_DAUGHTER` | `EDIT{add_daughter}` |
//! | [`OverlapsActor`] | `PROJECT_LOADED`, `EDITED` | `OVERLAPS` |
//! | [`SelectionActor`] | lineage, `SET_CELL`, `NEXT_CELL`, .. | `SELECTED` |

mod division;
mod divisions;
mod hovering;
mod overlaps;
mod selection;

pub use division::{DivisionEditor, DivisionState};
pub use divisions::{DivisionsActor, ADD_DAUGHTER_ACTION};
pub use hovering::HoveringActor;
pub use overlaps::OverlapsActor;
pub use selection::SelectionActor;
