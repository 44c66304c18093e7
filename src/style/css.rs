// src/style/css.rs

//! CSS minification and vendor prefixing, both backed by lightningcss.

use std::collections::BTreeMap;
use std::fmt::Display;

use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use tracing::warn;

use crate::errors::{AssetflowError, Result};
use crate::pipeline::{Artifact, Transform, TransformError};

/// Map a lightningcss error onto a located diagnostic.
///
/// lightningcss reports 0-based lines; diagnostics are 1-based.
pub fn css_error<T: Display>(file: &str, err: lightningcss::error::Error<T>) -> TransformError {
    match err.loc {
        Some(loc) => TransformError::Located {
            file: file.to_string(),
            line: loc.line + 1,
            column: loc.column,
            message: err.kind.to_string(),
        },
        None => TransformError::Message {
            file: file.to_string(),
            message: err.kind.to_string(),
        },
    }
}

fn process(input: Artifact, targets: Targets) -> std::result::Result<Artifact, TransformError> {
    let name = input.name.clone();
    let printed = {
        let source = input.text()?;
        let options = ParserOptions {
            filename: name.clone(),
            ..ParserOptions::default()
        };
        let mut sheet = StyleSheet::parse(source, options).map_err(|e| css_error(&name, e))?;
        sheet
            .minify(MinifyOptions {
                targets,
                ..MinifyOptions::default()
            })
            .map_err(|e| css_error(&name, e))?;
        sheet
            .to_css(PrinterOptions {
                minify: true,
                targets,
                ..PrinterOptions::default()
            })
            .map_err(|e| css_error(&name, e))?
            .code
    };
    Ok(input.with_contents(printed))
}

/// Whitespace and redundancy removal, no browser targets.
#[derive(Debug, Clone, Copy, Default)]
pub struct Minify;

impl Transform for Minify {
    fn name(&self) -> &str {
        "minify"
    }

    fn apply(&self, input: Artifact) -> std::result::Result<Artifact, TransformError> {
        process(input, Targets::default())
    }
}

/// Adds the vendor prefixes the configured browsers need.
#[derive(Debug, Clone, Copy)]
pub struct Prefix {
    targets: Targets,
}

impl Prefix {
    pub fn new(browsers: Browsers) -> Self {
        Self {
            targets: Targets {
                browsers: Some(browsers),
                ..Targets::default()
            },
        }
    }

    /// Build from the `browsers` section of the config.
    pub fn from_config(browsers: &BTreeMap<String, String>) -> Result<Self> {
        Ok(Self::new(browsers_from_config(browsers)?))
    }
}

impl Transform for Prefix {
    fn name(&self) -> &str {
        "autoprefix"
    }

    fn apply(&self, input: Artifact) -> std::result::Result<Artifact, TransformError> {
        process(input, self.targets)
    }
}

/// Encode `major[.minor[.patch]]` the way lightningcss expects.
pub fn encode_version(version: &str) -> Option<u32> {
    let mut parts = version.trim().split('.');
    let major: u32 = parts.next()?.parse().ok()?;
    let minor: u32 = parts.next().map_or(Some(0), |p| p.parse().ok())?;
    let patch: u32 = parts.next().map_or(Some(0), |p| p.parse().ok())?;
    if parts.next().is_some() || major > 255 || minor > 255 || patch > 255 {
        return None;
    }
    Some((major << 16) | (minor << 8) | patch)
}

/// Minimum browser versions from a `{ "chrome": "49", ... }` map.
///
/// Unknown browser names are skipped with a warning; a malformed version is
/// a config error.
pub fn browsers_from_config(map: &BTreeMap<String, String>) -> Result<Browsers> {
    let mut browsers = Browsers::default();
    for (name, version) in map {
        let encoded = encode_version(version).ok_or_else(|| {
            AssetflowError::ConfigError(format!(
                "browsers.{name}: '{version}' is not a version number"
            ))
        })?;
        let slot = match name.to_ascii_lowercase().as_str() {
            "android" => &mut browsers.android,
            "chrome" => &mut browsers.chrome,
            "edge" => &mut browsers.edge,
            "firefox" => &mut browsers.firefox,
            "ie" => &mut browsers.ie,
            "ios_saf" | "ios" => &mut browsers.ios_saf,
            "opera" => &mut browsers.opera,
            "safari" => &mut browsers.safari,
            "samsung" => &mut browsers.samsung,
            other => {
                warn!(browser = other, "unknown browser in config; ignoring");
                continue;
            }
        };
        *slot = Some(encoded);
    }
    Ok(browsers)
}
