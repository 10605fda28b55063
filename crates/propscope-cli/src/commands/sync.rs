use std::path::{Path, PathBuf};

use anyhow::Result;
use colored::Colorize;
use propscope_watch::{SyncManager, SyncSummary};

use crate::vault;

pub async fn execute(manager: &SyncManager, vault_root: &Path, paths: Vec<PathBuf>) -> Result<()> {
    let targets = if paths.is_empty() {
        vault::list_markdown_files(vault_root)?
    } else {
        paths
    };

    if targets.is_empty() {
        println!("{} No markdown files found.", "Info:".cyan().bold());
        return Ok(());
    }

    let summary = manager.sync_paths(&targets).await;
    print_summary(&summary);

    if summary.failed > 0 {
        anyhow::bail!("{} document(s) failed to sync", summary.failed);
    }
    Ok(())
}

fn print_summary(summary: &SyncSummary) {
    println!(
        "{} {} synced, {} already clean, {} outside rules, {} failed",
        "Sync:".green().bold(),
        summary.synced,
        summary.clean,
        summary.not_scoped,
        summary.failed
    );
}
