//! Ordered frontmatter property map.

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

/// One document's frontmatter block as an ordered key/value map.
///
/// Keys keep their document order across reads, inserts and removals so
/// a rewrite of the block stays diff-friendly. Values are arbitrary
/// YAML ([`serde_yaml::Value`]) and are moved verbatim, never coerced.
/// A present key with a `null` value is a real value, distinct from an
/// absent key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrontmatterMap(Mapping);

impl FrontmatterMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self(Mapping::new())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Get the value for `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Insert `value` under `key`, returning the previous value. An
    /// existing key keeps its position; a new key appends.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(Value::String(key.into()), value)
    }

    /// Remove `key`, preserving the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    /// Iterate entries in document order, skipping non-string keys.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0
            .iter()
            .filter_map(|(key, value)| key.as_str().map(|k| (k, value)))
    }

    /// Borrow the underlying YAML mapping.
    pub fn as_mapping(&self) -> &Mapping {
        &self.0
    }
}

impl From<Mapping> for FrontmatterMap {
    fn from(mapping: Mapping) -> Self {
        Self(mapping)
    }
}

impl From<FrontmatterMap> for Mapping {
    fn from(fm: FrontmatterMap) -> Self {
        fm.0
    }
}
