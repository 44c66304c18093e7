// src/watch/watcher.rs

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use notify::event::EventKind;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Input of the watch session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// A file under a watched tree was created, modified or removed.
    Changed(PathBuf),
    /// End the session.
    Shutdown,
}

/// Keeps one filesystem watcher alive. Dropping it stops watching.
pub struct WatcherHandle {
    root: PathBuf,
    _inner: RecommendedWatcher,
}

impl fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatcherHandle")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl WatcherHandle {
    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Whether a notify event can mean changed content.
pub fn is_relevant(kind: &EventKind) -> bool {
    !matches!(kind, EventKind::Access(_))
}

/// Watch `root` recursively, forwarding changed paths to `tx`.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    tx: mpsc::UnboundedSender<WatchEvent>,
) -> Result<WatcherHandle> {
    let root = root.into();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if !is_relevant(&event.kind) {
                    return;
                }
                for path in event.paths {
                    if tx.send(WatchEvent::Changed(path)).is_err() {
                        debug!("watch session gone; dropping notify event");
                        return;
                    }
                }
            }
            Err(err) => warn!(error = %err, "file watch error"),
        },
        Config::default(),
    )
    .context("creating file watcher")?;

    watcher
        .watch(&root, RecursiveMode::Recursive)
        .with_context(|| format!("watching {root:?}"))?;

    info!(root = ?root, "file watcher started");
    Ok(WatcherHandle {
        root,
        _inner: watcher,
    })
}

/// One watcher per existing root; missing roots are skipped with a warning.
pub fn spawn_watchers(
    roots: &[PathBuf],
    tx: &mpsc::UnboundedSender<WatchEvent>,
) -> Result<Vec<WatcherHandle>> {
    let mut handles = Vec::with_capacity(roots.len());
    for root in roots {
        if !root.is_dir() {
            warn!(root = ?root, "watch root does not exist; not watching it");
            continue;
        }
        handles.push(spawn_watcher(root.clone(), tx.clone())?);
    }
    Ok(handles)
}
