//! Bus and direct messages.
//!
//! Every message exchanged between actors is a [`Message`]. The wire form
//! is `{ "type": "EDITED", ...fields }`, so messages logged or persisted as
//! JSON read the same as the names used throughout the docs.
//!
//! # Taxonomy
//!
//! | Group | Messages |
//! |-------|----------|
//! | API outcome | `LOADING`, `LOADED`, `PROJECT_LOADED`, `ERROR`, `EDITED` |
//! | API intent | `EDIT`, `UNDO`, `REDO`, `SET_DISPLAY_DIM`, `TOGGLE_RGB` |
//! | History | `SAVE`, `RESTORE`, `SAVED`, `RESTORED`, `REVERT_SAVE` |
//! | Edit-keyed history | `SNAPSHOT`, `UNDO_EDIT`, `REDO_EDIT` |
//! | Hovering | `COORDINATES`, `SET_FRAME`, `LABELED_ARRAY`, `OVERLAPS`, `HOVERING` |
//! | Selection | `SELECT`, `SELECTED`, `SET_CELL`, `RESET_CELL`, `NEXT_CELL`, `PREV_CELL` |
//! | Divisions | `CLICK`, `ADD_DAUGHTER_MODE`, `ADD_DAUGHTER`, `RESET` |
//! | Persistence | `PROJECT_NOT_IN_DB` |
//! | Misc | `REFRESH` |
//!
//! # Filtering
//!
//! [`MessageKind`] is the payload-free discriminant of a message. Bus
//! subscriptions may filter on it:
//!
//! ```
//! use relabel_event::{Message, MessageKind};
//!
//! let msg = Message::Error { message: "bad arg".into() };
//! assert_eq!(msg.kind(), MessageKind::Error);
//! assert_eq!(msg.kind().as_str(), "ERROR");
//! ```

use crate::project::{Grid, Overlaps, Project, ProjectDelta};
use crate::Snapshot;
use relabel_types::{CellId, EditId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

/// A message on a bus or sent directly to an actor.
///
/// Messages are immutable once published. Large payloads are held in
/// `Arc` so fan-out to many subscribers does not copy image data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    // --- API outcome ---
    /// A remote call started.
    Loading,
    /// A remote call succeeded with `delta`.
    Loaded {
        /// Changes returned by the service.
        delta: ProjectDelta,
    },
    /// The initial project fetch succeeded.
    ProjectLoaded {
        /// Full project.
        project: Arc<Project>,
    },
    /// A remote call failed.
    Error {
        /// Human-readable reason.
        message: String,
    },
    /// A labeled slice changed.
    Edited {
        /// Frame of the slice.
        frame: usize,
        /// Feature of the slice.
        feature: usize,
        /// New slice contents.
        labeled: Arc<Grid<i32>>,
        /// Overlaps table after the edit.
        overlaps: Arc<Overlaps>,
    },

    // --- API intent ---
    /// Apply a label edit.
    Edit {
        /// Service action name, e.g. `swap_single_frame`.
        action: String,
        /// Form-encoded arguments.
        #[serde(default)]
        args: BTreeMap<String, String>,
    },
    /// Undo the latest action.
    Undo,
    /// Redo the latest undone action.
    Redo,
    /// Change a display dimension (frame, channel, feature).
    SetDisplayDim {
        /// Dimension name.
        dimension: String,
        /// New index.
        value: usize,
    },
    /// Toggle RGB display mode.
    ToggleRgb,

    // --- history ---
    /// Capture a checkpoint.
    Save,
    /// Restore to `snapshot`, or the reply to `SAVE` carrying it.
    Restore {
        /// Private actor state.
        snapshot: Snapshot,
    },
    /// A checkpoint was captured.
    Saved,
    /// A restore finished.
    Restored {
        /// Edit restored, for the edit-keyed history.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        edit: Option<EditId>,
    },
    /// Drop the most recent checkpoint without restoring it.
    RevertSave,
    /// Record the before/after pair of a label edit.
    Snapshot {
        /// Edit id.
        edit: EditId,
        /// State before the edit.
        before: Snapshot,
        /// State after the edit.
        after: Snapshot,
    },
    /// Undo one recorded edit.
    UndoEdit {
        /// Edit id.
        edit: EditId,
    },
    /// Redo one undone edit.
    RedoEdit {
        /// Edit id.
        edit: EditId,
    },

    // --- hovering ---
    /// Cursor position in image pixels.
    Coordinates {
        /// X position; may lie outside the image.
        x: i64,
        /// Y position; may lie outside the image.
        y: i64,
    },
    /// Current frame changed.
    SetFrame {
        /// New frame.
        t: usize,
    },
    /// Displayed labeled array changed.
    LabeledArray {
        /// Frame of the array.
        frame: usize,
        /// Feature of the array.
        feature: usize,
        /// Array contents.
        labeled: Arc<Grid<i32>>,
    },
    /// Current overlaps table.
    Overlaps {
        /// Table contents.
        overlaps: Arc<Overlaps>,
    },
    /// Cells under the cursor.
    Hovering {
        /// Hovered cells, sorted.
        hovering: BTreeSet<CellId>,
    },

    // --- selection ---
    /// Select a cell (alias of `SET_CELL`).
    Select {
        /// Cell to select.
        cell: CellId,
    },
    /// Selection changed.
    Selected {
        /// Selected cell, if any.
        selected: Option<CellId>,
    },
    /// Select a cell.
    SetCell {
        /// Cell to select.
        cell: CellId,
    },
    /// Clear the selection.
    ResetCell,
    /// Select the next cell in lineage order.
    NextCell,
    /// Select the previous cell in lineage order.
    PrevCell,

    // --- divisions ---
    /// Mouse click on the canvas.
    Click {
        /// Whether a modifier key was held.
        #[serde(default)]
        modified: bool,
    },
    /// Start choosing a daughter for `parent`.
    AddDaughterMode {
        /// Dividing cell.
        parent: CellId,
    },
    /// Add `daughter` to `parent`'s division.
    AddDaughter {
        /// Dividing cell.
        parent: CellId,
        /// New daughter.
        daughter: CellId,
        /// Frame of the click.
        t: usize,
    },
    /// Return to the initial state.
    Reset,

    // --- persistence ---
    /// The local store has no copy of the project.
    ProjectNotInDb,

    /// Republish current state for late subscribers.
    Refresh,
}

impl Message {
    /// A `RESTORED` without an edit id.
    #[must_use]
    pub fn restored() -> Self {
        Self::Restored { edit: None }
    }

    /// Returns the payload-free discriminant.
    #[must_use]
    pub fn kind(&self) -> MessageKind {
        match self {
            Self::Loading => MessageKind::Loading,
            Self::Loaded { .. } => MessageKind::Loaded,
            Self::ProjectLoaded { .. } => MessageKind::ProjectLoaded,
            Self::Error { .. } => MessageKind::Error,
            Self::Edited { .. } => MessageKind::Edited,
            Self::Edit { .. } => MessageKind::Edit,
            Self::Undo => MessageKind::Undo,
            Self::Redo => MessageKind::Redo,
            Self::SetDisplayDim { .. } => MessageKind::SetDisplayDim,
            Self::ToggleRgb => MessageKind::ToggleRgb,
            Self::Save => MessageKind::Save,
            Self::Restore { .. } => MessageKind::Restore,
            Self::Saved => MessageKind::Saved,
            Self::Restored { .. } => MessageKind::Restored,
            Self::RevertSave => MessageKind::RevertSave,
            Self::Snapshot { .. } => MessageKind::Snapshot,
            Self::UndoEdit { .. } => MessageKind::UndoEdit,
            Self::RedoEdit { .. } => MessageKind::RedoEdit,
            Self::Coordinates { .. } => MessageKind::Coordinates,
            Self::SetFrame { .. } => MessageKind::SetFrame,
            Self::LabeledArray { .. } => MessageKind::LabeledArray,
            Self::Overlaps { .. } => MessageKind::Overlaps,
            Self::Hovering { .. } => MessageKind::Hovering,
            Self::Select { .. } => MessageKind::Select,
            Self::Selected { .. } => MessageKind::Selected,
            Self::SetCell { .. } => MessageKind::SetCell,
            Self::ResetCell => MessageKind::ResetCell,
            Self::NextCell => MessageKind::NextCell,
            Self::PrevCell => MessageKind::PrevCell,
            Self::Click { .. } => MessageKind::Click,
            Self::AddDaughterMode { .. } => MessageKind::AddDaughterMode,
            Self::AddDaughter { .. } => MessageKind::AddDaughter,
            Self::Reset => MessageKind::Reset,
            Self::ProjectNotInDb => MessageKind::ProjectNotInDb,
            Self::Refresh => MessageKind::Refresh,
        }
    }

    /// Returns `true` for messages that end an API call
    /// (`LOADED`, `PROJECT_LOADED`, `ERROR`).
    #[must_use]
    pub fn is_api_outcome(&self) -> bool {
        matches!(
            self,
            Self::Loaded { .. } | Self::ProjectLoaded { .. } | Self::Error { .. }
        )
    }

    /// Returns `true` for requests the API actor admits from `Idle`.
    #[must_use]
    pub fn is_api_request(&self) -> bool {
        matches!(
            self,
            Self::Edit { .. }
                | Self::Undo
                | Self::Redo
                | Self::SetDisplayDim { .. }
                | Self::ToggleRgb
        )
    }
}

/// Payload-free discriminant of a [`Message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[allow(missing_docs)]
pub enum MessageKind {
    Loading,
    Loaded,
    ProjectLoaded,
    Error,
    Edited,
    Edit,
    Undo,
    Redo,
    SetDisplayDim,
    ToggleRgb,
    Save,
    Restore,
    Saved,
    Restored,
    RevertSave,
    Snapshot,
    UndoEdit,
    RedoEdit,
    Coordinates,
    SetFrame,
    LabeledArray,
    Overlaps,
    Hovering,
    Select,
    Selected,
    SetCell,
    ResetCell,
    NextCell,
    PrevCell,
    Click,
    AddDaughterMode,
    AddDaughter,
    Reset,
    ProjectNotInDb,
    Refresh,
}

impl MessageKind {
    /// Returns the wire name, e.g. `"PROJECT_NOT_IN_DB"`.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Loading => "LOADING",
            Self::Loaded => "LOADED",
            Self::ProjectLoaded => "PROJECT_LOADED",
            Self::Error => "ERROR",
            Self::Edited => "EDITED",
            Self::Edit => "EDIT",
            Self::Undo => "UNDO",
            Self::Redo => "REDO",
            Self::SetDisplayDim => "SET_DISPLAY_DIM",
            Self::ToggleRgb => "TOGGLE_RGB",
            Self::Save => "SAVE",
            Self::Restore => "RESTORE",
            Self::Saved => "SAVED",
            Self::Restored => "RESTORED",
            Self::RevertSave => "REVERT_SAVE",
            Self::Snapshot => "SNAPSHOT",
            Self::UndoEdit => "UNDO_EDIT",
            Self::RedoEdit => "REDO_EDIT",
            Self::Coordinates => "COORDINATES",
            Self::SetFrame => "SET_FRAME",
            Self::LabeledArray => "LABELED_ARRAY",
            Self::Overlaps => "OVERLAPS",
            Self::Hovering => "HOVERING",
            Self::Select => "SELECT",
            Self::Selected => "SELECTED",
            Self::SetCell => "SET_CELL",
            Self::ResetCell => "RESET_CELL",
            Self::NextCell => "NEXT_CELL",
            Self::PrevCell => "PREV_CELL",
            Self::Click => "CLICK",
            Self::AddDaughterMode => "ADD_DAUGHTER_MODE",
            Self::AddDaughter => "ADD_DAUGHTER",
            Self::Reset => "RESET",
            Self::ProjectNotInDb => "PROJECT_NOT_IN_DB",
            Self::Refresh => "REFRESH",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
