//! Settings file handling.
//!
//! Settings live in a `.propscope.yaml` at the vault root (or wherever
//! `--config` points). A missing file means default settings; a file
//! that exists but does not parse is an error rather than a silent
//! fallback.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use propscope_core::PropscopeSettings;
use tracing::debug;

/// Default config file name, relative to the vault root.
pub const CONFIG_FILE_NAME: &str = ".propscope.yaml";

/// Starter config written by `pscope init`.
pub const STARTER_CONFIG: &str = "\
# propscope configuration
#
# Ordered folder rules; the first matching rule wins.
rules:
  - folder_prefix: index/projects/
    namespace_slug: projects
    template_enabled: false
    template_yaml: ''

# Comma-separated alias keys propscope is allowed to migrate.
managed_properties: 'priority, status'

# Storage key format: prefix + slug + separator + alias.
storage:
  prefix: ''
  separator: '__'

# Delete the plain alias key once its value moved to the storage key.
remove_plain_on_sync: true

# Delete storage keys when restoring aliases.
delete_storage_on_restore: false

# Debounce window for coalescing sync triggers, in milliseconds.
debounce_ms: 500
";

/// Resolve the config file path from the CLI flags.
pub fn config_path(vault: &Path, explicit: Option<&Path>) -> PathBuf {
    match explicit {
        Some(path) => path.to_path_buf(),
        None => vault.join(CONFIG_FILE_NAME),
    }
}

/// Load settings from `path`. A missing file yields defaults.
pub async fn load(path: &Path) -> Result<PropscopeSettings> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => {
            let settings: PropscopeSettings = serde_yaml::from_str(&text)
                .with_context(|| format!("invalid config file {}", path.display()))?;
            debug!("loaded config from {}", path.display());
            Ok(settings)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("no config at {}, using defaults", path.display());
            Ok(PropscopeSettings::default())
        }
        Err(e) => Err(e).with_context(|| format!("cannot read config file {}", path.display())),
    }
}

/// Persist settings to `path`.
pub async fn save(path: &Path, settings: &PropscopeSettings) -> Result<()> {
    let yaml = serde_yaml::to_string(settings).context("serialize settings")?;
    tokio::fs::write(path, yaml)
        .await
        .with_context(|| format!("cannot write config file {}", path.display()))?;
    Ok(())
}
