// src/watch/patterns.rs

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::GlobSet;

use crate::assets::FileSet;
use crate::assets::fileset::build_globset;
use crate::dag::TaskId;
use crate::exec::BuildContext;
use crate::fs::FileSystem;
use crate::watch::path_utils::relative_str;

/// What to tell live-sync clients after a successful rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterBuild {
    /// The builder notifies clients itself (or nothing to notify).
    Nothing,
    /// Full page reload.
    Reload,
}

/// Source tree whose changes trigger a task.
///
/// Patterns are relative to `root`; `*` does not cross `/`.
#[derive(Clone)]
pub struct WatchBinding {
    task: TaskId,
    root: PathBuf,
    patterns: Vec<String>,
    set: GlobSet,
    after: AfterBuild,
}

impl fmt::Debug for WatchBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchBinding")
            .field("task", &self.task)
            .field("root", &self.root)
            .field("patterns", &self.patterns)
            .field("after", &self.after)
            .finish()
    }
}

impl WatchBinding {
    pub fn new(
        task: TaskId,
        root: impl Into<PathBuf>,
        patterns: &[&str],
        after: AfterBuild,
    ) -> Result<Self> {
        let patterns: Vec<String> = patterns.iter().map(|p| p.to_string()).collect();
        let set = build_globset(&patterns)
            .with_context(|| format!("building watch globset for task {task}"))?;
        Ok(Self {
            task,
            root: root.into(),
            patterns,
            set,
            after,
        })
    }

    pub fn task(&self) -> TaskId {
        self.task
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn after(&self) -> AfterBuild {
        self.after
    }

    /// Match a path relative to the binding's root, e.g. `"partials/_a.scss"`.
    pub fn matches(&self, rel_path: &str) -> bool {
        self.set.is_match(rel_path)
    }

    /// Match an absolute (event) path.
    pub fn matches_path(&self, fs: &dyn FileSystem, path: &Path) -> bool {
        relative_str(fs, &self.root, path).is_some_and(|rel| self.matches(&rel))
    }

    /// Files currently matching, for priming the hash cache.
    pub fn current_files(&self, fs: &dyn FileSystem) -> Result<Vec<PathBuf>> {
        let set = self
            .patterns
            .iter()
            .fold(FileSet::new(&self.root), |set, p| set.include(p.as_str()));
        Ok(set.resolve(fs)?.into_iter().map(|f| f.path).collect())
    }
}

/// Stylesheets rebuild `css` (the style builder injects the new CSS);
/// scripts rebuild `js` followed by a full reload.
pub fn default_bindings(ctx: &BuildContext) -> Result<Vec<WatchBinding>> {
    Ok(vec![
        WatchBinding::new(
            TaskId::Css,
            ctx.style_src_dir(),
            &["**/*.scss"],
            AfterBuild::Nothing,
        )?,
        WatchBinding::new(
            TaskId::Js,
            ctx.script_src_dir(),
            &["**/*.js"],
            AfterBuild::Reload,
        )?,
    ])
}

/// Tasks whose bindings match `path`, without duplicates.
pub fn tasks_for_path(
    fs: &dyn FileSystem,
    bindings: &[WatchBinding],
    path: &Path,
) -> Vec<TaskId> {
    let mut tasks: Vec<TaskId> = bindings
        .iter()
        .filter(|b| b.matches_path(fs, path))
        .map(WatchBinding::task)
        .collect();
    tasks.sort();
    tasks.dedup();
    tasks
}
