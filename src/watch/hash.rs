// src/watch/hash.rs

//! Content hashing (blake3), used to skip work when bytes did not change.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use blake3::Hasher;
use tracing::debug;

use crate::fs::FileSystem;

/// Hash a byte buffer.
pub fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Hasher::new();
    hasher.update(bytes);
    hasher.finalize().to_hex().to_string()
}

/// Hash one file's contents.
pub fn compute_file_hash(fs: &dyn FileSystem, path: &Path) -> Result<String> {
    let bytes = fs.read(path)?;
    Ok(hash_bytes(&bytes))
}

/// Last-seen content hash per file.
///
/// The watcher records the hash of every file it reports; a later event for
/// the same file with identical contents (editor "save without change",
/// touch, metadata-only events) is recognised as a no-op.
#[derive(Debug, Default)]
pub struct ContentHashes {
    hashes: HashMap<PathBuf, String>,
}

impl ContentHashes {
    pub fn new() -> Self {
        Self {
            hashes: HashMap::new(),
        }
    }

    /// Record the current hash of `path`; returns `true` if it differs from
    /// the previously recorded one (or nothing was recorded yet).
    ///
    /// Files that cannot be read (e.g. deleted) always count as changed and
    /// are forgotten.
    pub fn refresh(&mut self, fs: &dyn FileSystem, path: &Path) -> bool {
        match compute_file_hash(fs, path) {
            Ok(hash) => {
                let changed = self.hashes.get(path) != Some(&hash);
                if !changed {
                    debug!(path = ?path, "content hash unchanged");
                }
                self.hashes.insert(path.to_path_buf(), hash);
                changed
            }
            Err(_) => {
                self.hashes.remove(path);
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }
}
