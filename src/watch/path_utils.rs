// src/watch/path_utils.rs

//! Utility functions for path handling in the watcher.

use std::path::Path;

use crate::assets::fileset::to_slash;
use crate::fs::FileSystem;

/// `path` relative to `root`, with forward slashes.
///
/// Tries a plain prefix strip first, then again with both sides
/// canonicalized (symlinked temp dirs such as macOS `/private/var`).
/// Returns `None` when `path` is not under `root`.
pub fn relative_str(fs: &dyn FileSystem, root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(to_slash(rel));
    }

    let root_canon = fs.canonicalize(root).ok()?;
    // A deleted file cannot be canonicalized; its parent usually can.
    let path_canon = match fs.canonicalize(path) {
        Ok(p) => p,
        Err(_) => {
            let parent = fs.canonicalize(path.parent()?).ok()?;
            parent.join(path.file_name()?)
        }
    };

    path_canon.strip_prefix(&root_canon).ok().map(to_slash)
}
