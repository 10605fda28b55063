//! Creation-time template defaults for new documents.

use serde_yaml::Value;
use tracing::trace;

use crate::error::{Error, Result};
use crate::frontmatter::FrontmatterMap;
use crate::keys::StorageKeyConfig;

/// Parse a template body into an ordered key/value map.
///
/// A blank body is valid and yields an empty map (the template simply
/// does nothing). Invalid YAML is a [`Error::TemplateParse`]; valid
/// YAML that is not a mapping (a list, a bare scalar) is a
/// [`Error::TemplateShape`].
pub fn parse_template(text: &str) -> Result<FrontmatterMap> {
    if text.trim().is_empty() {
        return Ok(FrontmatterMap::new());
    }

    let value: Value = serde_yaml::from_str(text)?;
    match value {
        Value::Mapping(mapping) => Ok(FrontmatterMap::from(mapping)),
        Value::Null => Ok(FrontmatterMap::new()),
        Value::Sequence(_) => Err(Error::TemplateShape("a list".to_string())),
        Value::Tagged(_) => Err(Error::TemplateShape("a tagged value".to_string())),
        Value::Bool(_) | Value::Number(_) | Value::String(_) => {
            Err(Error::TemplateShape("a scalar".to_string()))
        }
    }
}

/// Apply template `defaults` to a newly created document, in
/// declaration order.
///
/// Per declared key: skipped when `managed_keys` is non-empty and does
/// not contain it, and skipped when the storage key already exists.
/// Otherwise the storage key is set to the default value. When the
/// removal-on-sync policy is OFF the plain alias key is also set to
/// the default, unless already present, so both stay visible in the
/// less strict mode.
pub fn apply_template(
    fm: &mut FrontmatterMap,
    defaults: &FrontmatterMap,
    config: &StorageKeyConfig,
    slug: &str,
    managed_keys: &[String],
    remove_plain_on_sync: bool,
) {
    for (key, value) in defaults.entries() {
        if !managed_keys.is_empty() && !managed_keys.iter().any(|k| k == key) {
            trace!("template key '{}' is not managed, skipping", key);
            continue;
        }

        let storage = config.storage_key(slug, key);
        if fm.contains_key(&storage) {
            continue;
        }

        fm.insert(storage, value.clone());
        if !remove_plain_on_sync && !fm.contains_key(key) {
            fm.insert(key.to_string(), value.clone());
        }
    }
}
