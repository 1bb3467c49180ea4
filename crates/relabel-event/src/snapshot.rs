//! Private actor state snapshots.
//!
//! A [`Snapshot`] is an immutable mapping of named fields to JSON values.
//! History actors store snapshots without looking inside them; only the
//! actor that produced a snapshot knows how to read it back.
//!
//! Equality is structural: two snapshots are equal when they hold the same
//! field names with equal values.
//!
//! # Example
//!
//! ```
//! use relabel_event::Snapshot;
//!
//! let snap = Snapshot::new()
//!     .with_field("selected", &Some(3u32))
//!     .unwrap();
//!
//! let selected: Option<u32> = snap.field("selected").unwrap();
//! assert_eq!(selected, Some(3));
//! assert_eq!(snap, Snapshot::new().with_field("selected", &Some(3u32)).unwrap());
//! ```

use crate::EventError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Named fields of an actor's private state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(BTreeMap<String, serde_json::Value>);

impl Snapshot {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the snapshot with `name` set to the serialized `value`.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::Serialization`] if `value` cannot be encoded.
    pub fn with_field<T: Serialize + ?Sized>(
        mut self,
        name: impl Into<String>,
        value: &T,
    ) -> Result<Self, EventError> {
        let name = name.into();
        let value =
            serde_json::to_value(value).map_err(|e| EventError::serialization(&name, &e))?;
        self.0.insert(name, value);
        Ok(self)
    }

    /// Decodes field `name`.
    ///
    /// # Errors
    ///
    /// - [`EventError::MissingField`] if the field is absent
    /// - [`EventError::Serialization`] if it does not decode as `T`
    pub fn field<T: DeserializeOwned>(&self, name: &str) -> Result<T, EventError> {
        let value = self
            .0
            .get(name)
            .ok_or_else(|| EventError::missing_field(name))?;
        serde_json::from_value(value.clone()).map_err(|e| EventError::serialization(name, &e))
    }

    /// Returns the raw value of field `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.0.get(name)
    }

    /// Returns the number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the snapshot has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, serde_json::Value)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (String, serde_json::Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_field_reported() {
        let err = Snapshot::new().field::<u32>("selected").unwrap_err();
        assert_eq!(err, EventError::missing_field("selected"));
    }

    #[test]
    fn wrong_type_reported() {
        let snap = Snapshot::new().with_field("selected", "three").unwrap();
        let err = snap.field::<u32>("selected").unwrap_err();
        assert!(matches!(err, EventError::Serialization { ref field, .. } if field == "selected"));
    }

    #[test]
    fn equality_is_structural() {
        let a: Snapshot = [("a".to_string(), json!(1)), ("b".to_string(), json!([1, 2]))]
            .into_iter()
            .collect();
        let b: Snapshot = [("b".to_string(), json!([1, 2])), ("a".to_string(), json!(1))]
            .into_iter()
            .collect();
        assert_eq!(a, b);
        assert_ne!(a, Snapshot::new());
    }

    #[test]
    fn serializes_as_plain_object() {
        let snap = Snapshot::new().with_field("t", &2).unwrap();
        assert_eq!(serde_json::to_value(&snap).unwrap(), json!({"t": 2}));
    }
}
