//! Inverse of the sync transform: storage keys back to alias keys.

use tracing::trace;

use crate::frontmatter::FrontmatterMap;
use crate::keys::StorageKeyConfig;

/// Copy storage-key values back to their alias keys, in managed-key
/// order, overwriting any existing alias value. When `delete_storage`
/// is set the storage key is removed afterwards.
///
/// A key whose storage key is absent is skipped. With deletion enabled
/// a second call finds nothing left to restore and is a plain no-op.
pub fn restore_aliases(
    fm: &mut FrontmatterMap,
    config: &StorageKeyConfig,
    slug: &str,
    managed_keys: &[String],
    delete_storage: bool,
) {
    for alias in managed_keys {
        let storage = config.storage_key(slug, alias);
        if let Some(value) = fm.get(&storage).cloned() {
            trace!("restoring '{}' from '{}'", alias, storage);
            fm.insert(alias.clone(), value);
            if delete_storage {
                fm.remove(&storage);
            }
        }
    }
}
