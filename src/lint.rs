// src/lint.rs

//! Diagnostics shared by the style and script linters.

use std::fmt;
use std::path::PathBuf;

use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

/// One lint finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub file: PathBuf,
    /// 1-based.
    pub line: usize,
    /// 1-based.
    pub column: usize,
    pub rule: &'static str,
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{} [{}] {}",
            self.file.display(),
            self.line,
            self.column,
            self.rule,
            self.message
        )
    }
}

/// Result of linting a set of files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LintReport {
    pub files_checked: usize,
    /// Files rewritten by autofix.
    pub files_fixed: Vec<PathBuf>,
    /// Violations left after fixing.
    pub diagnostics: Vec<Diagnostic>,
}

impl LintReport {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn count(&self, rule: &str) -> usize {
        self.diagnostics.iter().filter(|d| d.rule == rule).count()
    }

    /// Emit every diagnostic as a `warn!` event plus an `info!` summary.
    pub fn log(&self, linter: &str) {
        for d in &self.diagnostics {
            warn!(linter, "{d}");
        }
        info!(
            linter,
            files = self.files_checked,
            fixed = self.files_fixed.len(),
            problems = self.diagnostics.len(),
            "lint finished"
        );
    }
}
