// src/config/model.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::lenient;

/// Effective build configuration.
///
/// Mirrors the JSON override file; every section is optional there and is
/// deep-merged over [`BuildConfig::default`]:
///
/// ```json
/// {
///   "src":  { "stylePath": "./src/scss", "scriptPath": "./src/js" },
///   "dist": { "cssPath": "./static/css", "scriptPath": "./static/js", "fontPath": "./static/fonts" },
///   "packagesPath": "./node_modules",
///   "sync": true,
///   "syncTarget": "http://localhost/"
/// }
/// ```
///
/// Paths are kept as the strings the user wrote; resolving them against the
/// project root happens in [`crate::exec::BuildContext`]. Values of the wrong
/// JSON type are accepted (see [`super::lenient`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfig {
    #[serde(default, deserialize_with = "lenient::section")]
    pub src: SourcePaths,

    #[serde(default, deserialize_with = "lenient::section")]
    pub dist: DistPaths,

    /// Sub-paths of the vendor framework, relative to `packages_path`.
    #[serde(default, deserialize_with = "lenient::section")]
    pub vendor: VendorPaths,

    #[serde(default = "default_packages_path", deserialize_with = "lenient::string")]
    pub packages_path: String,

    /// Start the live-sync hub in watch mode.
    #[serde(default, deserialize_with = "lenient::flag")]
    pub sync: bool,

    /// Upstream URL proxied by the live-sync server.
    #[serde(default = "default_sync_target", deserialize_with = "lenient::string")]
    pub sync_target: String,

    /// Minimum browser versions used for vendor prefixing, e.g. `"safari": "10"`.
    #[serde(default = "default_browsers", deserialize_with = "lenient::string_map")]
    pub browsers: BTreeMap<String, String>,

    #[serde(default, deserialize_with = "lenient::section")]
    pub tools: ToolsSection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourcePaths {
    #[serde(default = "default_src_style_path", deserialize_with = "lenient::string")]
    pub style_path: String,
    #[serde(default = "default_src_script_path", deserialize_with = "lenient::string")]
    pub script_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DistPaths {
    #[serde(default = "default_dist_css_path", deserialize_with = "lenient::string")]
    pub css_path: String,
    #[serde(default = "default_dist_script_path", deserialize_with = "lenient::string")]
    pub script_path: String,
    #[serde(default = "default_dist_font_path", deserialize_with = "lenient::string")]
    pub font_path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorPaths {
    #[serde(default = "default_vendor_font_path", deserialize_with = "lenient::string")]
    pub font_path: String,
    #[serde(default = "default_vendor_style_path", deserialize_with = "lenient::string")]
    pub style_path: String,
    #[serde(default = "default_vendor_script_path", deserialize_with = "lenient::string")]
    pub script_path: String,
}

/// External tools plugged into the pipelines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsSection {
    /// Shell command used as the script transpile step (stdin -> stdout).
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub transpiler: Option<String>,
}

fn default_src_style_path() -> String {
    "./src/scss".to_string()
}

fn default_src_script_path() -> String {
    "./src/js".to_string()
}

fn default_dist_css_path() -> String {
    "./static/css".to_string()
}

fn default_dist_script_path() -> String {
    "./static/js".to_string()
}

fn default_dist_font_path() -> String {
    "./static/fonts".to_string()
}

fn default_vendor_font_path() -> String {
    "/ucf-athena-framework/dist/fonts".to_string()
}

fn default_vendor_style_path() -> String {
    "/ucf-athena-framework/src/scss".to_string()
}

fn default_vendor_script_path() -> String {
    "/ucf-athena-framework/dist/js".to_string()
}

fn default_packages_path() -> String {
    "./node_modules".to_string()
}

fn default_sync_target() -> String {
    "http://localhost/".to_string()
}

fn default_browsers() -> BTreeMap<String, String> {
    [
        ("chrome", "49"),
        ("edge", "15"),
        ("firefox", "52"),
        ("ie", "11"),
        ("ios_saf", "10"),
        ("safari", "10"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

impl Default for SourcePaths {
    fn default() -> Self {
        Self {
            style_path: default_src_style_path(),
            script_path: default_src_script_path(),
        }
    }
}

impl Default for DistPaths {
    fn default() -> Self {
        Self {
            css_path: default_dist_css_path(),
            script_path: default_dist_script_path(),
            font_path: default_dist_font_path(),
        }
    }
}

impl Default for VendorPaths {
    fn default() -> Self {
        Self {
            font_path: default_vendor_font_path(),
            style_path: default_vendor_style_path(),
            script_path: default_vendor_script_path(),
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            src: SourcePaths::default(),
            dist: DistPaths::default(),
            vendor: VendorPaths::default(),
            packages_path: default_packages_path(),
            sync: false,
            sync_target: default_sync_target(),
            browsers: default_browsers(),
            tools: ToolsSection::default(),
        }
    }
}
