use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::filter::LevelFilter;

use propscope_cli::{
    cli::{Cli, Commands, LogLevel},
    commands, config,
    store::VaultStore,
};
use propscope_watch::SyncManager;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let level: LevelFilter = if cli.verbose {
        LogLevel::Debug.into()
    } else {
        cli.log_level.unwrap_or(LogLevel::Warn).into()
    };
    if level != LevelFilter::OFF {
        let filter = format!(
            "propscope_core={level},propscope_watch={level},propscope_cli={level},pscope={level}"
        );
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
            .init();
    }

    let config_path = config::config_path(&cli.vault, cli.config.as_deref());

    match cli.command {
        Commands::Init => commands::init::execute(&config_path).await,
        Commands::Rules { path } => {
            let settings = config::load(&config_path).await?;
            commands::rules::execute(&settings, path)
        }
        Commands::Manage { key, no_sync } => {
            commands::manage::execute(&config_path, &cli.vault, &key, no_sync).await
        }
        Commands::Sync { paths } => {
            let manager = build_manager(&config_path, &cli.vault).await?;
            commands::sync::execute(&manager, &cli.vault, paths).await
        }
        Commands::Restore {
            paths,
            delete_storage,
            keep_storage,
        } => {
            let manager = build_manager(&config_path, &cli.vault).await?;
            let delete = Cli::restore_override(delete_storage, keep_storage);
            commands::restore::execute(&manager, &cli.vault, paths, delete).await
        }
        Commands::Watch => {
            let manager = build_manager(&config_path, &cli.vault).await?;
            commands::watch::execute(manager, &cli.vault).await
        }
    }
}

async fn build_manager(config_path: &Path, vault: &Path) -> Result<SyncManager> {
    let settings = config::load(config_path).await?;
    let store = Arc::new(VaultStore::new(vault));
    Ok(SyncManager::new(settings, store.clone(), store))
}
