//! Per-level lookup results.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::pip::KeyCodec;

/// Named fields of the region matched at one hierarchy level.
///
/// Fields keep the order of the key schema; serialized as a JSON object in
/// that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelRecord {
    fields: Vec<(String, String)>,
}

impl LevelRecord {
    /// Pair attribute names with the values stored for a matched region
    pub fn from_fields(names: &[String], values: &[String]) -> Self {
        Self {
            fields: names
                .iter()
                .cloned()
                .zip(values.iter().cloned())
                .collect(),
        }
    }

    /// Split a composite key back into named fields.
    ///
    /// Returns `None` when the key does not split into exactly one field per
    /// name, which happens when a value contains the delimiter or the key
    /// was composed with a different one.
    pub fn decode(key: &str, names: &[String], codec: &KeyCodec) -> Option<Self> {
        let values = codec.decode_exact(key, names.len()).ok()?;
        Some(Self::from_fields(names, &values))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for LevelRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}
