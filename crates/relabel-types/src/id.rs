//! Identifier types for relabel.
//!
//! Actors are UUID-identified so log lines from different runs of the same
//! wiring can be correlated. Buses, projects and edits are named by
//! strings that come from configuration or the label service.

use crate::TryNew;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::{uuid, Uuid};

/// Namespace UUID for deterministic UUID v5 actor ids.
const RELABEL_NAMESPACE: Uuid = uuid!("5b0e4a0c-3f0e-4c51-9a3e-8f2d6c7e1a94");

/// Identifier for one running actor.
///
/// # UUID Strategy
///
/// - **Named actors** (`api`, `history`, `persistence`, ...): UUID v5
///   derived from the name, stable across processes
/// - **Ad-hoc actors** (observers, test doubles): UUID v4
///
/// # Example
///
/// ```
/// use relabel_types::ActorId;
///
/// let api = ActorId::named("api");
/// assert_eq!(api, ActorId::named("api"));
/// assert_eq!(api.to_string(), "api");
///
/// let observer = ActorId::new("observer");
/// assert_ne!(observer, ActorId::new("observer"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorId {
    /// Globally unique identifier.
    pub uuid: Uuid,
    /// Human-readable name used in logs.
    pub name: String,
}

impl ActorId {
    /// Creates an id with a random UUID v4.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
        }
    }

    /// Creates an id whose UUID is derived from `name`.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            uuid: Uuid::new_v5(&RELABEL_NAMESPACE, name.as_bytes()),
            name,
        }
    }

    /// Returns the actor name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Name of a publish/subscribe channel on the event bus.
///
/// Buses are declared at wiring time; there is no registry of valid names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BusId(String);

impl BusId {
    /// Creates a bus id.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the bus name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bus:{}", self.0)
    }
}

/// Error returned when a project id is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidProjectId {
    /// The id was empty.
    #[error("project id is empty")]
    Empty,
    /// The id contained a character outside `[A-Za-z0-9_-]`.
    #[error("project id contains invalid character {ch:?}: {id}")]
    InvalidChar {
        /// Offending id.
        id: String,
        /// First offending character.
        ch: char,
    },
}

/// Identifier of a project on the label service.
///
/// Project ids become URL path segments and file names, so only
/// ASCII alphanumerics, `-` and `_` are accepted.
///
/// # Example
///
/// ```
/// use relabel_types::{ProjectId, TryNew};
///
/// assert!(ProjectId::try_new("a1B2-c_3".to_string()).is_ok());
/// assert!(ProjectId::try_new("../etc".to_string()).is_err());
/// assert!(ProjectId::try_new(String::new()).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProjectId(String);

impl TryNew for ProjectId {
    type Error = InvalidProjectId;
    type Args = String;

    fn try_new(id: String) -> Result<Self, Self::Error> {
        if id.is_empty() {
            return Err(InvalidProjectId::Empty);
        }
        if let Some(ch) = id
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(InvalidProjectId::InvalidChar { id, ch });
        }
        Ok(Self(id))
    }
}

impl ProjectId {
    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ProjectId {
    type Error = InvalidProjectId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl From<ProjectId> for String {
    fn from(id: ProjectId) -> Self {
        id.0
    }
}

impl std::str::FromStr for ProjectId {
    type Err = InvalidProjectId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_new(s.to_string())
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of one label edit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EditId(String);

impl EditId {
    /// Creates an edit id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EditId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A cell: one tracked object across frames of a label image.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct CellId(pub u32);

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
