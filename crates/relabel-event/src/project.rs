//! Project data model.
//!
//! A project is the authoritative state owned by the label service:
//!
//! | Field | Shape | Meaning |
//! |-------|-------|---------|
//! | `raw` | `[channel][frame]` of `Grid<u16>` | raw image data |
//! | `labeled` | `[feature][frame]` of `Grid<i32>` | label values, 0 is background |
//! | `overlaps` | list of `(value, cell, t)` | which cells a label value covers |
//! | `lineage` | cell → [`LineageEntry`] | parent/daughter relations |
//! | `labels` | `Vec<String>` | feature and channel names |
//! | `spots` | `Vec<Spot>` | point annotations |
//!
//! The service answers edits with a [`ProjectDelta`]: every field is
//! optional, and a delta may carry a single labeled slice addressed by
//! `frame`/`feature` instead of the whole labeled stack.
//!
//! Grids serialize as nested row arrays, the form the service uses.

use crate::{EventError, Message};
use relabel_types::CellId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// A row-major 2D array.
///
/// # Example
///
/// ```
/// use relabel_event::Grid;
///
/// let grid = Grid::from_rows(vec![vec![0, 1], vec![2, 3]]).unwrap();
/// assert_eq!(grid.get(1, 0), Some(&1));
/// assert_eq!(grid.get(0, 1), Some(&2));
/// assert_eq!(grid.get(2, 0), None);
/// assert_eq!(grid.get(-1, 0), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "Vec<Vec<T>>",
    into = "Vec<Vec<T>>",
    bound(serialize = "T: Clone + Serialize", deserialize = "T: Deserialize<'de>")
)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T: Clone> Grid<T> {
    /// Creates a `width` x `height` grid filled with `value`.
    #[must_use]
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }
}

impl<T> Grid<T> {
    /// Builds a grid from rows.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::RaggedGrid`] if the rows differ in length.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self, EventError> {
        let height = rows.len();
        let width = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(width * height);
        for (row, cells) in rows.into_iter().enumerate() {
            if cells.len() != width {
                return Err(EventError::RaggedGrid {
                    row,
                    expected: width,
                    actual: cells.len(),
                });
            }
            data.extend(cells);
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns the value at `(x, y)`, or `None` outside the grid.
    #[must_use]
    pub fn get(&self, x: i64, y: i64) -> Option<&T> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x)
    }

    /// Sets the value at `(x, y)`. Returns `false` outside the grid.
    pub fn set(&mut self, x: usize, y: usize, value: T) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.data[y * self.width + x] = value;
        true
    }
}

impl<T> TryFrom<Vec<Vec<T>>> for Grid<T> {
    type Error = EventError;

    fn try_from(rows: Vec<Vec<T>>) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

impl<T> From<Grid<T>> for Vec<Vec<T>> {
    fn from(grid: Grid<T>) -> Self {
        let mut cells = grid.data.into_iter();
        (0..grid.height)
            .map(|_| cells.by_ref().take(grid.width).collect())
            .collect()
    }
}

/// Raw image stack, indexed `[channel][frame]`.
pub type Raw = Vec<Vec<Grid<u16>>>;

/// Labeled image stack, indexed `[feature][frame]`.
pub type Labeled = Vec<Vec<Arc<Grid<i32>>>>;

/// One row of the overlaps table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Overlap {
    /// Label value in the labeled image.
    pub value: i32,
    /// Cell covered by that value.
    pub cell: CellId,
    /// Frame the mapping holds in.
    pub t: usize,
}

/// Mapping from label values to the cells they cover, per frame.
///
/// One label value may cover several overlapping cells.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Overlaps(Vec<Overlap>);

impl Overlaps {
    /// Creates a table from rows.
    #[must_use]
    pub fn new(rows: Vec<Overlap>) -> Self {
        Self(rows)
    }

    /// Returns the cells covered by `value` at frame `t`.
    ///
    /// Value 0 is background and covers nothing.
    #[must_use]
    pub fn cells_at(&self, value: i32, t: usize) -> BTreeSet<CellId> {
        if value == 0 {
            return BTreeSet::new();
        }
        self.0
            .iter()
            .filter(|o| o.value == value && o.t == t)
            .map(|o| o.cell)
            .collect()
    }

    /// Returns all rows.
    #[must_use]
    pub fn rows(&self) -> &[Overlap] {
        &self.0
    }

    /// Returns `true` if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Lineage record of one cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LineageEntry {
    /// Mother cell, if the cell was born in a division.
    pub parent: Option<CellId>,
    /// Daughter cells, if the cell divides.
    pub daughters: Vec<CellId>,
    /// Frames the cell is present in.
    pub frames: Vec<usize>,
    /// Frame the cell divides in, if known.
    pub frame_div: Option<usize>,
}

/// Cell lineage keyed by cell id.
pub type Lineage = BTreeMap<CellId, LineageEntry>;

/// A cell dividing into daughters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Division {
    /// Dividing cell.
    pub parent: CellId,
    /// Cells born from the division.
    pub daughters: Vec<CellId>,
    /// Frame the daughters first appear in.
    pub t: usize,
}

/// Derives the division list from a lineage.
///
/// A division's frame is the recorded `frame_div`, otherwise the frame
/// after the parent's last frame.
#[must_use]
pub fn divisions(lineage: &Lineage) -> Vec<Division> {
    lineage
        .iter()
        .filter(|(_, entry)| !entry.daughters.is_empty())
        .map(|(cell, entry)| Division {
            parent: *cell,
            daughters: entry.daughters.clone(),
            t: entry
                .frame_div
                .unwrap_or_else(|| entry.frames.iter().max().map_or(0, |f| f + 1)),
        })
        .collect()
}

/// A point annotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spot {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

/// Authoritative project state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    /// Raw image stack.
    pub raw: Raw,
    /// Labeled image stack.
    pub labeled: Labeled,
    /// Label value to cell table.
    pub overlaps: Arc<Overlaps>,
    /// Cell lineage.
    pub lineage: Lineage,
    /// Feature and channel names.
    pub labels: Vec<String>,
    /// Point annotations.
    pub spots: Vec<Spot>,
}

impl Project {
    /// Merges `delta` into the project.
    ///
    /// The delta is validated before anything changes, so a failed merge
    /// leaves the project untouched.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::SliceOutOfRange`] if the delta addresses a
    /// labeled slice that exists in neither the project nor the delta.
    pub fn apply(&mut self, delta: &ProjectDelta) -> Result<(), EventError> {
        if let Some((frame, feature, _)) = delta.slice() {
            let stack = delta.labeled.as_ref().unwrap_or(&self.labeled);
            if stack.get(feature).and_then(|f| f.get(frame)).is_none() {
                return Err(EventError::SliceOutOfRange { feature, frame });
            }
        }

        if let Some(raw) = &delta.raw {
            self.raw = raw.clone();
        }
        if let Some(labeled) = &delta.labeled {
            self.labeled = labeled.clone();
        }
        if let Some((frame, feature, grid)) = delta.slice() {
            self.labeled[feature][frame] = Arc::clone(grid);
        }
        if let Some(overlaps) = &delta.overlaps {
            self.overlaps = Arc::clone(overlaps);
        }
        if let Some(lineage) = &delta.lineage {
            self.lineage = lineage.clone();
        }
        if let Some(labels) = &delta.labels {
            self.labels = labels.clone();
        }
        if let Some(spots) = &delta.spots {
            self.spots = spots.clone();
        }
        Ok(())
    }

    /// Replaces one labeled slice and the overlaps table.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::SliceOutOfRange`] if the slice does not exist.
    pub fn patch_slice(
        &mut self,
        frame: usize,
        feature: usize,
        labeled: Arc<Grid<i32>>,
        overlaps: Arc<Overlaps>,
    ) -> Result<(), EventError> {
        let slot = self
            .labeled
            .get_mut(feature)
            .and_then(|f| f.get_mut(frame))
            .ok_or(EventError::SliceOutOfRange { feature, frame })?;
        *slot = labeled;
        self.overlaps = overlaps;
        Ok(())
    }

    /// Returns the labeled slice at `(frame, feature)`.
    #[must_use]
    pub fn labeled_at(&self, frame: usize, feature: usize) -> Option<&Arc<Grid<i32>>> {
        self.labeled.get(feature).and_then(|f| f.get(frame))
    }

    /// Number of frames in the labeled stack.
    #[must_use]
    pub fn frames(&self) -> usize {
        self.labeled.first().map_or(0, Vec::len)
    }
}

/// Partial project update returned by the label service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectDelta {
    /// Replacement raw stack.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<Raw>,
    /// Replacement labeled stack.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labeled: Option<Labeled>,
    /// Replacement overlaps table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overlaps: Option<Arc<Overlaps>>,
    /// Replacement lineage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lineage: Option<Lineage>,
    /// Replacement label names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
    /// Replacement spots.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spots: Option<Vec<Spot>>,
    /// Frame of `labeled_frame`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame: Option<usize>,
    /// Feature of `labeled_frame`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feature: Option<usize>,
    /// A single edited labeled slice.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labeled_frame: Option<Arc<Grid<i32>>>,
}

impl ProjectDelta {
    /// Returns `true` if the delta changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Returns the addressed labeled slice as `(frame, feature, grid)`.
    #[must_use]
    pub fn slice(&self) -> Option<(usize, usize, &Arc<Grid<i32>>)> {
        match (self.frame, self.feature, &self.labeled_frame) {
            (Some(frame), Some(feature), Some(grid)) => Some((frame, feature, grid)),
            _ => None,
        }
    }

    /// Builds the `EDITED` message for this delta's labeled slice.
    ///
    /// `current_overlaps` is used when the delta carries no overlaps of its
    /// own. Returns `None` if the delta has no slice.
    #[must_use]
    pub fn edited(&self, current_overlaps: &Arc<Overlaps>) -> Option<Message> {
        let (frame, feature, grid) = self.slice()?;
        Some(Message::Edited {
            frame,
            feature,
            labeled: Arc::clone(grid),
            overlaps: Arc::clone(self.overlaps.as_ref().unwrap_or(current_overlaps)),
        })
    }
}

impl From<Project> for ProjectDelta {
    fn from(project: Project) -> Self {
        Self {
            raw: Some(project.raw),
            labeled: Some(project.labeled),
            overlaps: Some(project.overlaps),
            lineage: Some(project.lineage),
            labels: Some(project.labels),
            spots: Some(project.spots),
            ..Self::default()
        }
    }
}
