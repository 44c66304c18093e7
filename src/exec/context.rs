// src/exec/context.rs

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::config::BuildConfig;
use crate::fs::{FileSystem, RealFileSystem};
use crate::livesync::LiveSyncHandle;

/// Everything a build action needs, constructed once per process and shared
/// read-only (behind an `Arc`) by every action.
#[derive(Clone)]
pub struct BuildContext {
    /// Project root; relative config paths are resolved against it.
    pub root: PathBuf,
    pub config: BuildConfig,
    pub fs: Arc<dyn FileSystem>,
    /// Present in watch mode when `sync` is enabled.
    pub live_sync: Option<LiveSyncHandle>,
    /// Source files rewritten by the build itself (lint autofix).
    pub source_writes: SourceWrites,
}

/// Shared log of source files the build rewrote, drained by the watcher so
/// its own writes do not count as edits.
#[derive(Debug, Clone, Default)]
pub struct SourceWrites(Arc<Mutex<Vec<PathBuf>>>);

impl SourceWrites {
    pub fn record(&self, path: impl Into<PathBuf>) {
        let mut paths = match self.0.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        paths.push(path.into());
    }

    /// Everything recorded since the last call.
    pub fn take(&self) -> Vec<PathBuf> {
        let mut paths = match self.0.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        std::mem::take(&mut *paths)
    }
}

impl fmt::Debug for BuildContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildContext")
            .field("root", &self.root)
            .field("live_sync", &self.live_sync.is_some())
            .finish_non_exhaustive()
    }
}

impl BuildContext {
    pub fn new(root: impl Into<PathBuf>, config: BuildConfig, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            root: root.into(),
            config,
            fs,
            live_sync: None,
            source_writes: SourceWrites::default(),
        }
    }

    /// Context on the real filesystem.
    pub fn on_disk(root: impl Into<PathBuf>, config: BuildConfig) -> Self {
        Self::new(root, config, Arc::new(RealFileSystem))
    }

    pub fn with_live_sync(mut self, handle: LiveSyncHandle) -> Self {
        self.live_sync = Some(handle);
        self
    }

    /// Resolve a configured path against the project root.
    pub fn resolve(&self, configured: &str) -> PathBuf {
        normalize(&self.root.join(configured))
    }

    pub fn style_src_dir(&self) -> PathBuf {
        self.resolve(&self.config.src.style_path)
    }

    pub fn script_src_dir(&self) -> PathBuf {
        self.resolve(&self.config.src.script_path)
    }

    pub fn packages_dir(&self) -> PathBuf {
        self.resolve(&self.config.packages_path)
    }

    pub fn css_dest_dir(&self) -> PathBuf {
        self.resolve(&self.config.dist.css_path)
    }

    pub fn script_dest_dir(&self) -> PathBuf {
        self.resolve(&self.config.dist.script_path)
    }

    pub fn font_dest_dir(&self) -> PathBuf {
        self.resolve(&self.config.dist.font_path)
    }

    pub fn vendor_font_dir(&self) -> PathBuf {
        self.vendor_dir(&self.config.vendor.font_path)
    }

    pub fn vendor_style_dir(&self) -> PathBuf {
        self.vendor_dir(&self.config.vendor.style_path)
    }

    pub fn vendor_script_dir(&self) -> PathBuf {
        self.vendor_dir(&self.config.vendor.script_path)
    }

    /// Vendor sub-paths are written with a leading `/` but always live
    /// inside the packages directory.
    fn vendor_dir(&self, sub_path: &str) -> PathBuf {
        normalize(&self.packages_dir().join(sub_path.trim_start_matches(['/', '\\'])))
    }
}

/// Drop interior `.` components (`/a/./b` -> `/a/b`).
fn normalize(path: &Path) -> PathBuf {
    path.components().collect()
}
