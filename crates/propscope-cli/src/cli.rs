use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::filter::LevelFilter;

/// Log level options for the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    /// No logging output
    Off,
    /// Error messages only
    Error,
    /// Warnings and errors
    Warn,
    /// Informational messages
    Info,
    /// Debug messages
    Debug,
    /// Trace-level messages (most verbose)
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Parser)]
#[command(name = "pscope")]
#[command(about = "pscope - folder-scoped frontmatter property namespacing for markdown vaults")]
#[command(version)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Vault root directory
    #[arg(short = 'd', long, global = true, default_value = ".")]
    pub vault: PathBuf,

    /// Config file path (defaults to <vault>/.propscope.yaml)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Set log level (off, error, warn, info, debug, trace)
    #[arg(short = 'l', long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Enable verbose logging (shortcut for --log-level=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a starter config file into the vault
    Init,

    /// Migrate alias keys into storage keys now
    Sync {
        /// Documents to sync (vault-relative); all matched documents
        /// when omitted
        paths: Vec<PathBuf>,
    },

    /// Copy storage-key values back to alias keys
    Restore {
        /// Documents to restore (vault-relative); all matched
        /// documents when omitted
        paths: Vec<PathBuf>,

        /// Delete storage keys after restoring, overriding the config
        #[arg(long, conflicts_with = "keep_storage")]
        delete_storage: bool,

        /// Keep storage keys after restoring, overriding the config
        #[arg(long)]
        keep_storage: bool,
    },

    /// Show configured folder rules, or resolve one document
    Rules {
        /// Document path to resolve against the rules
        path: Option<PathBuf>,
    },

    /// Add a managed property to the config, then sync the vault
    Manage {
        /// Alias key to manage (e.g. `priority`)
        key: String,

        /// Skip the follow-up vault sync
        #[arg(long)]
        no_sync: bool,
    },

    /// Watch the vault and sync documents as they change
    Watch,
}

impl Cli {
    /// Restore override from the two mutually exclusive flags.
    pub fn restore_override(delete_storage: bool, keep_storage: bool) -> Option<bool> {
        match (delete_storage, keep_storage) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}
