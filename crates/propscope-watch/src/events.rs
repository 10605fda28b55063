//! Document lifecycle events and sync trigger reasons.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A document lifecycle notification from the host surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultEvent {
    /// Kind of lifecycle event.
    pub kind: VaultEventKind,

    /// Vault-relative document path.
    pub path: PathBuf,
}

impl VaultEvent {
    /// Create a new event.
    pub fn new(kind: VaultEventKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }
}

/// Kinds of document lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VaultEventKind {
    /// Document was opened.
    Opened,
    /// Document content was modified.
    Modified,
    /// The metadata cache for the document was updated.
    MetadataChanged,
    /// Document was created.
    Created,
}

impl VaultEventKind {
    /// String form for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Opened => "opened",
            Self::Modified => "modified",
            Self::MetadataChanged => "metadata-changed",
            Self::Created => "created",
        }
    }
}

/// Why a sync operation was requested. When several triggers coalesce
/// in one debounce window, the most recent reason wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncReason {
    /// Document opened.
    Opened,
    /// Document modified.
    Modified,
    /// Metadata cache updated.
    MetadataChanged,
    /// Document created.
    Created,
    /// Follow-up after template application.
    PostTemplate,
    /// Explicit user command.
    Manual,
}

impl SyncReason {
    /// String form for logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Opened => "opened",
            Self::Modified => "modified",
            Self::MetadataChanged => "metadata-changed",
            Self::Created => "created",
            Self::PostTemplate => "post-template",
            Self::Manual => "manual",
        }
    }
}

impl From<VaultEventKind> for SyncReason {
    fn from(kind: VaultEventKind) -> Self {
        match kind {
            VaultEventKind::Opened => Self::Opened,
            VaultEventKind::Modified => Self::Modified,
            VaultEventKind::MetadataChanged => Self::MetadataChanged,
            VaultEventKind::Created => Self::Created,
        }
    }
}
