//! Storage error types.
//!
//! | Error | Code | Recoverable |
//! |-------|------|-------------|
//! | [`StorageError::NotFound`] | `STORAGE_NOT_FOUND` | Yes |
//! | [`StorageError::Io`] | `STORAGE_IO` | Yes |
//! | [`StorageError::Serialization`] | `STORAGE_SERIALIZATION` | No |
//! | [`StorageError::DirectoryCreation`] | `STORAGE_DIRECTORY_CREATION` | No |
//! | [`StorageError::VersionIncompatible`] | `STORAGE_VERSION_INCOMPATIBLE` | No |
//! | [`StorageError::Unavailable`] | `STORAGE_UNAVAILABLE` | Yes |

use relabel_types::ErrorCode;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from a [`ProjectStore`](super::ProjectStore).
#[derive(Debug, Error)]
pub enum StorageError {
    /// No stored copy of the project.
    #[error("project not found: {0}")]
    NotFound(String),

    /// File operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored document could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The store directory could not be created.
    #[error("failed to create storage directory: {path}")]
    DirectoryCreation {
        /// Directory that was being created.
        path: PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },

    /// The document was written by a newer format.
    #[error("version incompatible: file version {file_version}, supported {supported_version}")]
    VersionIncompatible {
        /// Version found in the document.
        file_version: u32,
        /// Highest version this build reads.
        supported_version: u32,
    },

    /// The store refused the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StorageError {
    /// Creates a [`StorageError::NotFound`].
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound(id.into())
    }

    /// Creates a [`StorageError::DirectoryCreation`].
    pub fn directory_creation(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::DirectoryCreation {
            path: path.into(),
            source,
        }
    }
}

impl ErrorCode for StorageError {
    fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "STORAGE_NOT_FOUND",
            Self::Io(_) => "STORAGE_IO",
            Self::Serialization(_) => "STORAGE_SERIALIZATION",
            Self::DirectoryCreation { .. } => "STORAGE_DIRECTORY_CREATION",
            Self::VersionIncompatible { .. } => "STORAGE_VERSION_INCOMPATIBLE",
            Self::Unavailable(_) => "STORAGE_UNAVAILABLE",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::Io(_) | Self::Unavailable(_))
    }
}
