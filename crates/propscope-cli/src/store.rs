//! File-backed metadata store over a vault directory.
//!
//! Implements the orchestration layer's collaborator traits against
//! plain markdown files: the frontmatter block is the region between a
//! leading `---` line and the next `---` line. A read-modify-write
//! parses the block, runs the mutator on the ordered map, and rewrites
//! the document through a temp-file rename so the document is never
//! observable half-written.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use propscope_core::FrontmatterMap;
use propscope_watch::{ContentReader, Error, FrontmatterMutator, MetadataStore, Result};
use serde_yaml::Value;
use tracing::{debug, trace};

/// Metadata store rooted at a vault directory. Document paths are
/// vault-relative; the same paths the rule resolver sees.
pub struct VaultStore {
    root: PathBuf,
}

impl VaultStore {
    /// Create a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The vault root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }
}

/// Split a document into its frontmatter block and body.
///
/// Returns the raw YAML between the delimiters (without them) and the
/// body after the closing delimiter. A document without a leading
/// `---` line has no block; the whole content is body.
pub fn split_frontmatter(content: &str) -> (Option<&str>, &str) {
    let after_open = if let Some(rest) = content.strip_prefix("---\n") {
        rest
    } else if let Some(rest) = content.strip_prefix("---\r\n") {
        rest
    } else {
        return (None, content);
    };

    // Closing delimiter immediately after the opening one.
    if let Some(body) = after_open.strip_prefix("---\n") {
        return (Some(""), body);
    }
    if let Some(body) = after_open.strip_prefix("---\r\n") {
        return (Some(""), body);
    }

    if let Some(idx) = after_open.find("\n---\n") {
        return (Some(&after_open[..idx + 1]), &after_open[idx + 5..]);
    }
    if let Some(idx) = after_open.find("\n---\r\n") {
        return (Some(&after_open[..idx + 1]), &after_open[idx + 6..]);
    }
    if let Some(yaml) = after_open.strip_suffix("\n---") {
        return (Some(yaml), "");
    }

    // Unterminated block: not frontmatter.
    (None, content)
}

/// Render a document from its frontmatter map and body. An empty map
/// drops the block entirely.
pub fn render_document(fm: &FrontmatterMap, body: &str) -> String {
    if fm.is_empty() {
        return body.to_string();
    }
    let yaml = serde_yaml::to_string(fm).unwrap_or_default();
    format!("---\n{}---\n{}", yaml, body)
}

fn parse_block(path: &Path, yaml: &str) -> Result<FrontmatterMap> {
    if yaml.trim().is_empty() {
        return Ok(FrontmatterMap::new());
    }
    let value: Value = serde_yaml::from_str(yaml)
        .map_err(|e| Error::Storage(format!("invalid frontmatter in {}: {}", path.display(), e)))?;
    match value {
        Value::Mapping(mapping) => Ok(FrontmatterMap::from(mapping)),
        Value::Null => Ok(FrontmatterMap::new()),
        _ => Err(Error::Storage(format!(
            "frontmatter in {} is not a key/value mapping",
            path.display()
        ))),
    }
}

async fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp = path.with_file_name(format!(".{}.pscope-tmp", file_name));
    tokio::fs::write(&tmp, content).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

#[async_trait]
impl MetadataStore for VaultStore {
    async fn read_frontmatter(&self, path: &Path) -> Option<FrontmatterMap> {
        let content = tokio::fs::read_to_string(self.absolute(path)).await.ok()?;
        let (yaml, _) = split_frontmatter(&content);
        parse_block(path, yaml?).ok()
    }

    async fn process_frontmatter(&self, path: &Path, mutator: FrontmatterMutator) -> Result<()> {
        let target = self.absolute(path);
        let content = tokio::fs::read_to_string(&target).await?;
        let (yaml, body) = split_frontmatter(&content);

        let mut fm = match yaml {
            Some(yaml) => parse_block(path, yaml)?,
            None => FrontmatterMap::new(),
        };
        let before = fm.clone();
        mutator(&mut fm);

        if fm == before {
            trace!("{} unchanged, skipping rewrite", path.display());
            return Ok(());
        }

        write_atomic(&target, &render_document(&fm, body)).await?;
        debug!("rewrote frontmatter of {}", path.display());
        Ok(())
    }
}

#[async_trait]
impl ContentReader for VaultStore {
    async fn read_raw_text(&self, path: &Path) -> Result<String> {
        Ok(tokio::fs::read_to_string(self.absolute(path)).await?)
    }
}
