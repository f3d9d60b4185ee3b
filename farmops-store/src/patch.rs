//! Shallow JSON merge for `update` patches.

use crate::Record;
use serde_json::Value;

/// Merges the top-level keys of `patch` over the JSON form of `entity` and
/// rebuilds the entity.
///
/// Keys in `protected` (and `id`) may appear only with their current value.
pub(crate) fn merge_patch<T: Record>(
    entity: &T,
    patch: &Value,
    protected: &[&'static str],
) -> Result<T, String> {
    let Value::Object(changes) = patch else {
        return Err("patch must be a JSON object".to_string());
    };
    let mut current = serde_json::to_value(entity).map_err(|e| e.to_string())?;
    let Value::Object(fields) = &mut current else {
        return Err(format!("{} does not serialize to a JSON object", T::KIND));
    };

    for (key, value) in changes {
        let is_guarded = key == "id" || protected.contains(&key.as_str());
        if is_guarded && fields.get(key) != Some(value) {
            return Err(format!("field `{key}` cannot be changed by a patch"));
        }
        fields.insert(key.clone(), value.clone());
    }

    serde_json::from_value(current).map_err(|e| e.to_string())
}
