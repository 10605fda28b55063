use std::path::{Path, PathBuf};

use anyhow::Result;
use colored::Colorize;
use propscope_watch::SyncManager;

use crate::vault;

pub async fn execute(
    manager: &SyncManager,
    vault_root: &Path,
    paths: Vec<PathBuf>,
    delete_storage: Option<bool>,
) -> Result<()> {
    let targets = if paths.is_empty() {
        vault::list_markdown_files(vault_root)?
    } else {
        paths
    };

    if targets.is_empty() {
        println!("{} No markdown files found.", "Info:".cyan().bold());
        return Ok(());
    }

    let summary = manager.restore_paths(&targets, delete_storage).await;
    println!(
        "{} {} restored, {} outside rules, {} failed",
        "Restore:".green().bold(),
        summary.restored,
        summary.not_scoped,
        summary.failed
    );

    if summary.failed > 0 {
        anyhow::bail!("{} document(s) failed to restore", summary.failed);
    }
    Ok(())
}
