// tests/common/mod.rs

#![allow(dead_code)]

use std::error::Error;
use std::path::{Path, PathBuf};

pub use assetflow_test_utils::builders::{MOCK_ROOT, ProjectFixture, mock_project};
pub use assetflow_test_utils::{init_tracing, with_timeout};

pub type TestResult = Result<(), Box<dyn Error>>;

/// Path under the in-memory project root.
pub fn mock_path(rel: &str) -> PathBuf {
    Path::new(MOCK_ROOT).join(rel)
}
