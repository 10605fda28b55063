//! Folder rules and scope resolution.

use serde::{Deserialize, Serialize};

/// A folder-scope rule: documents under `folder_prefix` get their
/// managed properties namespaced with `namespace_slug`.
///
/// Rules are kept as an ordered list and matched first-to-last; the
/// first matching rule wins regardless of prefix specificity. A rule
/// with an empty prefix or an empty slug is inert and never matches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FolderRule {
    /// Vault-relative folder prefix, e.g. `index/projects/`.
    pub folder_prefix: String,

    /// Namespace slug embedded in storage keys, e.g. `projects`.
    pub namespace_slug: String,

    /// Whether new documents under this folder get template defaults.
    pub template_enabled: bool,

    /// YAML block of default key/value pairs for new documents.
    pub template_yaml: String,
}

impl FolderRule {
    /// Create a rule without a template.
    pub fn new(folder_prefix: impl Into<String>, namespace_slug: impl Into<String>) -> Self {
        Self {
            folder_prefix: folder_prefix.into(),
            namespace_slug: namespace_slug.into(),
            template_enabled: false,
            template_yaml: String::new(),
        }
    }

    /// Attach a creation-time template.
    pub fn with_template(mut self, yaml: impl Into<String>) -> Self {
        self.template_enabled = true;
        self.template_yaml = yaml.into();
        self
    }

    /// The trimmed namespace slug.
    pub fn slug(&self) -> &str {
        self.namespace_slug.trim()
    }

    /// The normalized folder prefix (forward slashes, trailing `/`).
    pub fn normalized_prefix(&self) -> String {
        normalize_folder_prefix(&self.folder_prefix)
    }

    /// Whether this rule can ever match a document.
    pub fn is_inert(&self) -> bool {
        self.normalized_prefix().is_empty() || self.slug().is_empty()
    }
}

/// Normalize a folder prefix: trim, forward slashes, trailing `/`.
/// An empty input stays empty (the rule is inert).
pub fn normalize_folder_prefix(raw: &str) -> String {
    let mut prefix = raw.trim().replace('\\', "/");
    if prefix.is_empty() {
        return prefix;
    }
    if !prefix.ends_with('/') {
        prefix.push('/');
    }
    prefix
}

/// Normalize a document path to forward slashes.
pub fn normalize_path(raw: &str) -> String {
    raw.replace('\\', "/")
}

/// Find the first rule governing `path`.
///
/// Returns `None` when no rule matches or when `path` is not a
/// markdown document. Deterministic for identical inputs; never
/// inspects anything beyond the rule list and the path.
pub fn resolve_rule<'a>(path: &str, rules: &'a [FolderRule]) -> Option<&'a FolderRule> {
    let path = normalize_path(path);
    if !is_markdown_path(&path) {
        return None;
    }

    rules.iter().find(|rule| {
        let prefix = rule.normalized_prefix();
        !prefix.is_empty() && !rule.slug().is_empty() && path.starts_with(&prefix)
    })
}

fn is_markdown_path(path: &str) -> bool {
    path.rsplit_once('.')
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case("md"))
}
