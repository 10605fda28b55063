//! Error types for the propscope engine.

use thiserror::Error;

/// Errors that can occur in the core engine.
///
/// Partially configured rules (empty prefix, empty slug, empty managed
/// key list, empty template body) are not errors: they make the rule
/// inert and the affected operation a no-op.
#[derive(Error, Debug)]
pub enum Error {
    /// Template body is not valid YAML.
    #[error("Template parse error: {0}")]
    TemplateParse(#[from] serde_yaml::Error),

    /// Template parsed but is not a flat key/value mapping.
    #[error("Template must be a key/value mapping, got {0}")]
    TemplateShape(String),
}

/// Result type for core engine operations.
pub type Result<T> = std::result::Result<T, Error>;
