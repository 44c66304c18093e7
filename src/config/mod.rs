// src/config/mod.rs

//! Build configuration: defaults, JSON override loading and deep merge.

pub mod lenient;
pub mod loader;
pub mod merge;
pub mod model;

pub use loader::{DEFAULT_CONFIG_FILE, default_config_path, load_config, load_override};
pub use merge::{merge, merge_values};
pub use model::{BuildConfig, DistPaths, SourcePaths, ToolsSection, VendorPaths};
