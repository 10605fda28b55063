//! Collaborator contracts for the orchestration layer.
//!
//! The engine never touches documents directly: reading and writing
//! structured metadata goes through a [`MetadataStore`] capability,
//! raw content checks through a [`ContentReader`]. Implementations are
//! injected as `Arc<dyn _>` so the manager can be exercised against an
//! in-memory store in tests.

use std::path::Path;

use async_trait::async_trait;
use propscope_core::FrontmatterMap;

use crate::error::Result;

/// Mutation applied to a document's frontmatter during a scoped
/// read-modify-write.
pub type FrontmatterMutator = Box<dyn FnOnce(&mut FrontmatterMap) + Send>;

/// Access to a document's structured metadata block.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Best-effort snapshot of the document's frontmatter. May be
    /// stale or absent; used only as a cheap pre-check, never as the
    /// basis for a write.
    async fn read_frontmatter(&self, path: &Path) -> Option<FrontmatterMap>;

    /// Scoped read-modify-write: read the current metadata, run
    /// `mutator` synchronously on the mutable map, persist the result
    /// atomically relative to the document.
    async fn process_frontmatter(&self, path: &Path, mutator: FrontmatterMutator) -> Result<()>;
}

/// Access to a document's raw text content.
#[async_trait]
pub trait ContentReader: Send + Sync {
    /// Read the full raw text of the document.
    async fn read_raw_text(&self, path: &Path) -> Result<String>;
}
