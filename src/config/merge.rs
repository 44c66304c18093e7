// src/config/merge.rs

//! Deep merge of a user override over the built-in defaults.

use serde_json::{Map, Value};

use crate::config::model::BuildConfig;
use crate::errors::{AssetflowError, Result};

/// Legacy section/key names accepted in override files, mapped to the
/// canonical ones. Section aliases apply at the top level, key aliases inside
/// any nested object.
const SECTION_ALIASES: &[(&str, &str)] = &[("athena", "vendor")];
const KEY_ALIASES: &[(&str, &str)] = &[("scssPath", "stylePath"), ("jsPath", "scriptPath")];

/// Merge `overlay` into `base` in place.
///
/// - Objects are merged key by key, recursively, so overriding one nested
///   field keeps its siblings.
/// - Any other value in `overlay` replaces the one in `base` wholesale.
/// - `null` in `overlay` leaves `base` untouched.
pub fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (_, Value::Null) => {}
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        if !value.is_null() {
                            base_map.insert(key, value);
                        }
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

/// Rewrite legacy names in an override document to their canonical form.
///
/// A legacy name is only renamed when the canonical one is not also present;
/// otherwise the canonical entry wins and the legacy one is dropped.
pub fn normalize_aliases(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let renamed = rename_keys(map, SECTION_ALIASES);
            let nested = renamed
                .into_iter()
                .map(|(k, v)| (k, normalize_nested(v)))
                .collect();
            Value::Object(nested)
        }
        other => other,
    }
}

fn normalize_nested(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(rename_keys(map, KEY_ALIASES)),
        other => other,
    }
}

fn rename_keys(map: Map<String, Value>, aliases: &[(&str, &str)]) -> Map<String, Value> {
    let mut out = Map::new();
    let mut legacy = Vec::new();

    for (key, value) in map {
        match aliases.iter().find(|(from, _)| *from == key) {
            Some((_, to)) => legacy.push((to.to_string(), value)),
            None => {
                out.insert(key, value);
            }
        }
    }

    for (key, value) in legacy {
        out.entry(key).or_insert(value);
    }

    out
}

/// Produce the effective configuration from the defaults and an optional
/// override document.
///
/// No validation is performed. Values of the wrong JSON type are coerced (see
/// [`super::lenient`]) and empty or nonsensical paths are carried through
/// as-is; they only surface when a builder tries to use them. The only error
/// is an override document that is not an object.
pub fn merge(default: &BuildConfig, overlay: Option<Value>) -> Result<BuildConfig> {
    let Some(overlay) = overlay else {
        return Ok(default.clone());
    };

    if !overlay.is_object() && !overlay.is_null() {
        return Err(AssetflowError::ConfigError(format!(
            "override must be a JSON object (got {})",
            json_kind(&overlay)
        )));
    }

    let mut merged = serde_json::to_value(default)?;
    merge_values(&mut merged, normalize_aliases(overlay));

    serde_json::from_value(merged).map_err(|e| {
        AssetflowError::ConfigError(format!("override could not be applied: {e}"))
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
