// src/config/lenient.rs

//! Field deserialisers that accept any JSON value.
//!
//! Override values are not validated when the config is merged. A number
//! where a path is expected becomes the path `"5"`, a string in `sync` is
//! truthy, and the odd value shows up later in whichever builder uses it.

use std::collections::BTreeMap;

use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

/// Text form of a JSON value: strings as-is, other scalars printed,
/// arrays/objects as compact JSON.
pub fn text_of(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Truthiness of a JSON value (`0`, `""`, `false`, `null` are false).
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(text_of(Value::deserialize(d)?))
}

pub fn opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Null => None,
        other => Some(text_of(other)),
    })
}

pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    Ok(truthy(&Value::deserialize(d)?))
}

/// A map of strings; a non-object value yields an empty map.
pub fn string_map<'de, D: Deserializer<'de>>(d: D) -> Result<BTreeMap<String, String>, D::Error> {
    match Value::deserialize(d)? {
        Value::Object(entries) => Ok(entries.into_iter().map(|(k, v)| (k, text_of(v))).collect()),
        other => {
            warn!(value = %other, "expected an object of strings; ignoring it");
            Ok(BTreeMap::new())
        }
    }
}

/// A config section; a non-object value falls back to the section defaults.
pub fn section<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    match Value::deserialize(d)? {
        value @ Value::Object(_) => T::deserialize(value).map_err(D::Error::custom),
        other => {
            warn!(value = %other, "expected a config section object; using defaults");
            Ok(T::default())
        }
    }
}
