// src/config/loader.rs

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info};

use crate::config::merge::merge;
use crate::config::model::BuildConfig;
use crate::errors::{AssetflowError, Result};

/// Default override file name, looked up in the project root.
pub const DEFAULT_CONFIG_FILE: &str = "assetflow.json";

/// Read the override document at `path`.
///
/// A missing file is not an error and yields `None`. Malformed JSON is a
/// [`AssetflowError::ConfigError`] naming the file.
pub fn load_override(path: impl AsRef<Path>) -> Result<Option<Value>> {
    let path = path.as_ref();

    if !path.exists() {
        info!(path = ?path, "no override file found; using default configuration");
        return Ok(None);
    }

    let contents = std::fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&contents).map_err(|e| {
        AssetflowError::ConfigError(format!("{}: invalid JSON: {e}", path.display()))
    })?;

    debug!(path = ?path, "loaded override file");
    Ok(Some(value))
}

/// Load the effective configuration: defaults deep-merged with the override
/// file at `path` (if it exists).
///
/// This is the entry point the rest of the application uses; it is called
/// once per process and the result is passed around by reference.
pub fn load_config(path: impl AsRef<Path>) -> Result<BuildConfig> {
    let overlay = load_override(&path)?;
    merge(&BuildConfig::default(), overlay)
}

/// Helper to resolve the default config path.
pub fn default_config_path() -> PathBuf {
    PathBuf::from(DEFAULT_CONFIG_FILE)
}
