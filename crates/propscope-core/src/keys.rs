//! Storage key formatting.
//!
//! Every component that needs a namespaced key goes through
//! [`StorageKeyConfig::storage_key`]. There is deliberately exactly one
//! place that knows the key format.

use serde::{Deserialize, Serialize};

/// Separator used when the configured one is blank.
pub const DEFAULT_SEPARATOR: &str = "__";

/// Process-wide storage key format: `prefix + slug + separator + alias`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageKeyConfig {
    /// Optional prefix in front of the namespace slug. May be empty.
    pub prefix: String,

    /// Separator between slug and alias key. A blank value falls back
    /// to [`DEFAULT_SEPARATOR`].
    pub separator: String,
}

impl Default for StorageKeyConfig {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            separator: DEFAULT_SEPARATOR.to_string(),
        }
    }
}

impl StorageKeyConfig {
    /// Create a config with the given prefix and separator.
    pub fn new(prefix: impl Into<String>, separator: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            separator: separator.into(),
        }
    }

    /// The effective separator, never empty.
    pub fn separator(&self) -> &str {
        if self.separator.trim().is_empty() {
            DEFAULT_SEPARATOR
        } else {
            &self.separator
        }
    }

    /// Compute the storage key for `alias` under namespace `slug`.
    pub fn storage_key(&self, slug: &str, alias: &str) -> String {
        format!("{}{}{}{}", self.prefix, slug, self.separator(), alias)
    }
}
