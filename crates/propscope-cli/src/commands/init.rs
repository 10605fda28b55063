use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;

use crate::config::STARTER_CONFIG;

pub async fn execute(config_path: &Path) -> Result<()> {
    if tokio::fs::try_exists(config_path).await.unwrap_or(false) {
        println!(
            "{} Config already exists at {}. No changes made.",
            "Info:".cyan().bold(),
            config_path.display()
        );
        return Ok(());
    }

    tokio::fs::write(config_path, STARTER_CONFIG)
        .await
        .with_context(|| format!("cannot write {}", config_path.display()))?;

    println!(
        "{} Wrote starter config to {}",
        "Done:".green().bold(),
        config_path.display()
    );
    println!("Edit the folder rules and managed properties, then run `pscope sync`.");
    Ok(())
}
