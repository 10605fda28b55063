//! The key-migration transform: alias keys into storage keys.

use tracing::trace;

use crate::frontmatter::FrontmatterMap;
use crate::keys::StorageKeyConfig;

/// Fast pre-check: would [`apply_sync`] change anything?
///
/// True when, for any managed alias key, either the alias is present
/// without its storage key, or both are present and the removal policy
/// still has cleanup to do. This must agree exactly with what
/// [`apply_sync`] does; it exists only to skip needless rewrite
/// operations, never to relax them.
pub fn needs_sync(
    fm: &FrontmatterMap,
    config: &StorageKeyConfig,
    slug: &str,
    managed_keys: &[String],
    remove_plain_on_sync: bool,
) -> bool {
    managed_keys.iter().any(|alias| {
        let storage = config.storage_key(slug, alias);
        let has_storage = fm.contains_key(&storage);
        let has_alias = fm.contains_key(alias);
        (!has_storage && has_alias) || (has_storage && has_alias && remove_plain_on_sync)
    })
}

/// Migrate managed alias keys into their storage keys, in the order
/// the managed keys are listed.
///
/// Per key:
/// - storage key present: its value is left untouched (source of
///   truth); the alias is deleted when `remove_plain_on_sync` is set,
///   otherwise left alone.
/// - only the alias present: its value moves verbatim to the storage
///   key; the alias is deleted when `remove_plain_on_sync` is set.
/// - neither present: no-op.
///
/// Idempotent: a second application with the same inputs changes
/// nothing. Keys outside `managed_keys` are never touched, and a
/// storage key is never created without a value to move.
pub fn apply_sync(
    fm: &mut FrontmatterMap,
    config: &StorageKeyConfig,
    slug: &str,
    managed_keys: &[String],
    remove_plain_on_sync: bool,
) {
    for alias in managed_keys {
        let storage = config.storage_key(slug, alias);

        if fm.contains_key(&storage) {
            if fm.contains_key(alias) {
                if remove_plain_on_sync {
                    trace!("dropping alias '{}' in favor of '{}'", alias, storage);
                    fm.remove(alias);
                } else {
                    trace!("alias '{}' and '{}' both present, leaving both", alias, storage);
                }
            }
        } else if let Some(value) = fm.get(alias).cloned() {
            trace!("moving '{}' to '{}'", alias, storage);
            fm.insert(storage, value);
            if remove_plain_on_sync {
                fm.remove(alias);
            }
        }
    }
}
