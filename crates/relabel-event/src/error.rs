//! Event layer errors.
//!
//! # Error Code Convention
//!
//! All event errors use the `EVENT_` prefix:
//!
//! | Error | Code | Recoverable |
//! |-------|------|-------------|
//! | [`EventError::MissingField`] | `EVENT_MISSING_FIELD` | No |
//! | [`EventError::Serialization`] | `EVENT_SERIALIZATION` | No |
//! | [`EventError::RaggedGrid`] | `EVENT_RAGGED_GRID` | No |
//! | [`EventError::SliceOutOfRange`] | `EVENT_SLICE_OUT_OF_RANGE` | No |
//!
//! None of these are recoverable: they describe malformed data, which a
//! retry would reproduce.

use relabel_types::ErrorCode;
use thiserror::Error;

/// Event layer error.
///
/// # Example
///
/// ```
/// use relabel_event::EventError;
/// use relabel_types::ErrorCode;
///
/// let err = EventError::missing_field("selected");
/// assert_eq!(err.code(), "EVENT_MISSING_FIELD");
/// assert!(!err.is_recoverable());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    /// A snapshot lacks a field the reader expected.
    #[error("snapshot field missing: {0}")]
    MissingField(String),

    /// A snapshot field could not be converted to or from JSON.
    #[error("snapshot field {field}: {message}")]
    Serialization {
        /// Field name.
        field: String,
        /// Underlying serde message.
        message: String,
    },

    /// A grid was built from rows of unequal length.
    #[error("ragged grid: row {row} has {actual} columns, expected {expected}")]
    RaggedGrid {
        /// Index of the first bad row.
        row: usize,
        /// Width of the first row.
        expected: usize,
        /// Width of the bad row.
        actual: usize,
    },

    /// A delta addressed a labeled slice the project does not have.
    #[error("labeled slice out of range: feature {feature}, frame {frame}")]
    SliceOutOfRange {
        /// Feature index.
        feature: usize,
        /// Frame index.
        frame: usize,
    },
}

impl EventError {
    /// Creates a [`EventError::MissingField`].
    #[must_use]
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField(field.into())
    }

    /// Creates a [`EventError::Serialization`] from a serde error.
    #[must_use]
    pub fn serialization(field: impl Into<String>, err: &serde_json::Error) -> Self {
        Self::Serialization {
            field: field.into(),
            message: err.to_string(),
        }
    }
}

impl ErrorCode for EventError {
    fn code(&self) -> &'static str {
        match self {
            Self::MissingField(_) => "EVENT_MISSING_FIELD",
            Self::Serialization { .. } => "EVENT_SERIALIZATION",
            Self::RaggedGrid { .. } => "EVENT_RAGGED_GRID",
            Self::SliceOutOfRange { .. } => "EVENT_SLICE_OUT_OF_RANGE",
        }
    }

    fn is_recoverable(&self) -> bool {
        false
    }
}
