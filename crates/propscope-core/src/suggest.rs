//! Autocomplete filtering for storage keys.

use crate::keys::StorageKeyConfig;

/// Whether a property suggestion should be hidden from autocomplete.
///
/// A suggestion is hidden when it looks like a storage-key variant of
/// a managed alias key: `prefix + <nonempty slug> + separator +
/// <managed alias>`. Pure predicate, decoupled from any UI wiring;
/// callers decide what "suggestion" means in their surface.
pub fn is_suggestion_hidden(text: &str, managed_keys: &[String], config: &StorageKeyConfig) -> bool {
    let Some(rest) = text.strip_prefix(config.prefix.as_str()) else {
        return false;
    };
    let separator = config.separator();

    managed_keys.iter().any(|alias| {
        !alias.is_empty()
            && rest
                .strip_suffix(alias.as_str())
                .and_then(|middle| middle.strip_suffix(separator))
                .is_some_and(|slug| !slug.is_empty())
    })
}
