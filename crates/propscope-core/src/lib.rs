//! # Propscope Core Engine
//!
//! Pure synchronization and scope-resolution engine for folder-scoped
//! frontmatter property namespacing. Given a vault where users type
//! friendly property names (`priority`), propscope keeps those values
//! mirrored into namespaced storage keys (`projects__priority`) scoped
//! by folder rules.
//!
//! This crate contains no I/O and no async machinery: every transform
//! here is a pure function over a [`FrontmatterMap`]. Scheduling and
//! the metadata store collaborators live in `propscope-watch`.
//!
//! ## Invariant
//!
//! Once a storage key exists it is the source of truth. [`apply_sync`]
//! and [`apply_template`] never overwrite an existing storage key;
//! only [`restore_aliases`] copies values back out of storage keys.

pub mod error;
pub mod frontmatter;
pub mod keys;
pub mod restore;
pub mod rules;
pub mod settings;
pub mod suggest;
pub mod sync;
pub mod template;

pub use error::{Error, Result};
pub use frontmatter::FrontmatterMap;
pub use keys::{StorageKeyConfig, DEFAULT_SEPARATOR};
pub use restore::restore_aliases;
pub use rules::{normalize_folder_prefix, normalize_path, resolve_rule, FolderRule};
pub use settings::PropscopeSettings;
pub use suggest::is_suggestion_hidden;
pub use sync::{apply_sync, needs_sync};
pub use template::{apply_template, parse_template};
