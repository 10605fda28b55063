use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use colored::Colorize;
use propscope_watch::SyncManager;

use crate::store::VaultStore;
use crate::{commands, config};

pub async fn execute(config_path: &Path, vault_root: &Path, key: &str, no_sync: bool) -> Result<()> {
    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("property key must not be empty");
    }

    let mut settings = config::load(config_path).await?;
    if settings.managed_keys().iter().any(|managed| managed == key) {
        println!(
            "{} '{}' is already a managed property.",
            "Info:".cyan().bold(),
            key
        );
    } else {
        settings.add_managed_key(key);
        config::save(config_path, &settings).await?;
        println!(
            "{} Added '{}' to managed properties.",
            "Done:".green().bold(),
            key
        );
    }

    if no_sync {
        return Ok(());
    }

    let store = Arc::new(VaultStore::new(vault_root));
    let manager = SyncManager::new(settings, store.clone(), store);
    commands::sync::execute(&manager, vault_root, Vec::new()).await
}
