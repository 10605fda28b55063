//! Error types for the orchestration layer.

use thiserror::Error;

/// Errors that can occur while orchestrating sync operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Engine error (template parse/shape).
    #[error("Engine error: {0}")]
    Engine(#[from] propscope_core::Error),

    /// The metadata store rejected a read-modify-write.
    #[error("Metadata store error: {0}")]
    Storage(String),

    /// IO error reading document content.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for orchestration operations.
pub type Result<T> = std::result::Result<T, Error>;
