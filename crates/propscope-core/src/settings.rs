//! Persisted plugin settings.
//!
//! The core receives these as plain read-only inputs per operation; it
//! never persists them itself. The settings file lives with whatever
//! surface embeds the engine (the CLI keeps a `.propscope.yaml` in the
//! vault root).

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::keys::StorageKeyConfig;
use crate::rules::FolderRule;

fn default_debounce_ms() -> u64 {
    500
}

fn default_true() -> bool {
    true
}

/// Full propscope configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PropscopeSettings {
    /// Ordered folder rules; first match wins.
    pub rules: Vec<FolderRule>,

    /// Comma-separated list of managed alias keys, as the settings UI
    /// stores it. Use [`PropscopeSettings::managed_keys`] to read it.
    pub managed_properties: String,

    /// Storage key format.
    pub storage: StorageKeyConfig,

    /// Delete the plain alias key after its value moved to the storage
    /// key. When off, both keys stay visible.
    pub remove_plain_on_sync: bool,

    /// Default for deleting storage keys when restoring aliases.
    pub delete_storage_on_restore: bool,

    /// Debounce window for coalescing sync triggers, in milliseconds.
    pub debounce_ms: u64,

    /// Apply creation templates only to documents that do not already
    /// begin with a frontmatter block.
    pub template_only_without_frontmatter: bool,
}

impl Default for PropscopeSettings {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            managed_properties: String::new(),
            storage: StorageKeyConfig::default(),
            remove_plain_on_sync: true,
            delete_storage_on_restore: false,
            debounce_ms: default_debounce_ms(),
            template_only_without_frontmatter: default_true(),
        }
    }
}

impl PropscopeSettings {
    /// The managed alias keys, split on commas, trimmed, empties
    /// dropped. Duplicates are kept: redundant entries cost redundant
    /// work, never incorrect results.
    pub fn managed_keys(&self) -> Vec<String> {
        self.managed_properties
            .split(',')
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Append a managed alias key to the configured list.
    pub fn add_managed_key(&mut self, key: &str) {
        let key = key.trim();
        if key.is_empty() {
            return;
        }
        if self.managed_properties.trim().is_empty() {
            self.managed_properties = key.to_string();
        } else {
            self.managed_properties.push_str(", ");
            self.managed_properties.push_str(key);
        }
    }

    /// The debounce window as a [`Duration`].
    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
