// src/assets/fileset.rs

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use tracing::debug;

use crate::fs::FileSystem;

/// Glob-selected set of files under a base directory.
///
/// Patterns are relative to `base` and use `/` separators; `*` does not
/// cross directory boundaries, `**` does. A file is selected when it matches
/// at least one include pattern and no exclude pattern. Nothing is cached:
/// every [`FileSet::resolve`] walks the filesystem again.
#[derive(Debug, Clone)]
pub struct FileSet {
    base: PathBuf,
    include: Vec<String>,
    exclude: Vec<String>,
}

/// A file selected by a [`FileSet`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MatchedFile {
    pub path: PathBuf,
    /// Path relative to the set's base directory.
    pub relative: PathBuf,
}

impl FileSet {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            include: Vec::new(),
            exclude: Vec::new(),
        }
    }

    pub fn include(mut self, pattern: impl Into<String>) -> Self {
        self.include.push(pattern.into());
        self
    }

    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude.push(pattern.into());
        self
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn include_patterns(&self) -> &[String] {
        &self.include
    }

    pub fn exclude_patterns(&self) -> &[String] {
        &self.exclude
    }

    /// Walk `base` and return the selected files, sorted by path.
    ///
    /// A missing base directory is not an error; it selects nothing.
    pub fn resolve(&self, fs: &dyn FileSystem) -> Result<Vec<MatchedFile>> {
        if !fs.is_dir(&self.base) {
            debug!(base = ?self.base, "file set base does not exist; nothing selected");
            return Ok(Vec::new());
        }

        let include = build_globset(&self.include)
            .with_context(|| format!("building include globs for {:?}", self.base))?;
        let exclude = build_globset(&self.exclude)
            .with_context(|| format!("building exclude globs for {:?}", self.base))?;
        let max_depth = walk_depth(&self.include);

        let mut files = Vec::new();
        let mut stack = vec![(self.base.clone(), 0usize)];

        while let Some((dir, depth)) = stack.pop() {
            for path in fs.read_dir(&dir)? {
                if fs.is_dir(&path) {
                    if max_depth.is_none_or(|max| depth + 1 < max) {
                        stack.push((path, depth + 1));
                    }
                } else if fs.is_file(&path) {
                    let Ok(rel) = path.strip_prefix(&self.base) else {
                        continue;
                    };
                    let rel_str = to_slash(rel);
                    if include.is_match(&rel_str) && !exclude.is_match(&rel_str) {
                        files.push(MatchedFile {
                            relative: rel.to_path_buf(),
                            path,
                        });
                    }
                }
            }
        }

        files.sort();
        debug!(base = ?self.base, matched = files.len(), "resolved file set");
        Ok(files)
    }
}

/// `/`-separated string form of a relative path.
pub fn to_slash(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Build a GlobSet where `*` does not match `/`.
pub fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = GlobBuilder::new(pat)
            .literal_separator(true)
            .build()
            .with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

/// True if `s` contains glob metacharacters.
pub fn is_glob(s: &str) -> bool {
    s.contains(['*', '?', '[', '{'])
}

/// How many directory levels a walk needs for these patterns; `None` when a
/// `**` makes the depth unbounded.
fn walk_depth(patterns: &[String]) -> Option<usize> {
    if patterns.iter().any(|p| p.contains("**")) {
        return None;
    }
    Some(
        patterns
            .iter()
            .map(|p| p.matches('/').count() + 1)
            .max()
            .unwrap_or(1),
    )
}
