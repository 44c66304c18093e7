// src/watch/session.rs

//! The `watch` task: rebuild on source changes until Ctrl-C.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::dag::{TaskId, TaskRegistry};
use crate::engine::{Orchestrator, TriggerQueue};
use crate::errors::Result;
use crate::exec::BuildContext;
use crate::livesync::{LiveSyncHandle, Notification};
use crate::watch::hash::ContentHashes;
use crate::watch::patterns::{AfterBuild, WatchBinding, default_bindings, tasks_for_path};
use crate::watch::watcher::{WatchEvent, spawn_watchers};

/// Counters for one watch session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionReport {
    /// File events that queued at least one task.
    pub triggers: usize,
    /// Events ignored (no binding matched, or contents unchanged).
    pub ignored: usize,
    /// Task runs started.
    pub builds: usize,
    /// Task runs that did not fully succeed.
    pub failed_builds: usize,
}

/// Event loop of a watch session, independent of where events come from.
#[derive(Debug)]
pub struct WatchSession {
    orchestrator: Orchestrator,
    bindings: Vec<WatchBinding>,
    hashes: ContentHashes,
    queue: TriggerQueue,
    report: SessionReport,
}

impl WatchSession {
    pub fn new(orchestrator: Orchestrator, bindings: Vec<WatchBinding>) -> Self {
        Self {
            orchestrator,
            bindings,
            hashes: ContentHashes::new(),
            queue: TriggerQueue::new(),
            report: SessionReport::default(),
        }
    }

    pub fn bindings(&self) -> &[WatchBinding] {
        &self.bindings
    }

    pub fn queue(&self) -> &TriggerQueue {
        &self.queue
    }

    pub fn report(&self) -> SessionReport {
        self.report
    }

    /// Record the current contents of every watched file, so that events
    /// which do not change bytes are ignored from the start.
    pub fn prime(&mut self) -> Result<usize> {
        let fs = self.orchestrator.context().fs.clone();
        let mut primed = 0;
        for binding in &self.bindings {
            for path in binding.current_files(fs.as_ref())? {
                self.hashes.refresh(fs.as_ref(), &path);
                primed += 1;
            }
        }
        debug!(files = primed, "primed content hashes");
        Ok(primed)
    }

    /// Queue the tasks a changed path triggers. Returns them (empty when
    /// the event is ignored).
    pub fn on_change(&mut self, path: &Path) -> Vec<TaskId> {
        self.absorb_own_writes();
        let fs = self.orchestrator.context().fs.clone();
        let tasks = tasks_for_path(fs.as_ref(), &self.bindings, path);
        if tasks.is_empty() {
            self.report.ignored += 1;
            return tasks;
        }
        if !self.hashes.refresh(fs.as_ref(), path) {
            self.report.ignored += 1;
            return Vec::new();
        }

        info!(path = ?path, tasks = ?tasks, "change detected");
        self.report.triggers += 1;
        for task in &tasks {
            self.queue.record_trigger(*task);
        }
        tasks
    }

    /// Take the hashes of files the build rewrote (autofix), so the events
    /// for those writes are seen as unchanged.
    pub fn absorb_own_writes(&mut self) -> usize {
        let ctx = self.orchestrator.context().clone();
        let written = ctx.source_writes.take();
        for path in &written {
            self.hashes.refresh(ctx.fs.as_ref(), path);
        }
        if !written.is_empty() {
            debug!(files = written.len(), "absorbed hashes of build-written sources");
        }
        written.len()
    }

    fn reload_tasks(&self) -> Vec<TaskId> {
        self.bindings
            .iter()
            .filter(|b| b.after() == AfterBuild::Reload)
            .map(WatchBinding::task)
            .collect()
    }

    /// Process events until `Shutdown` or until every sender is gone.
    ///
    /// Changes arriving while a build runs are queued and coalesced into
    /// the next build. A failed build is logged and watching continues.
    pub async fn run(mut self, mut events: mpsc::UnboundedReceiver<WatchEvent>) -> SessionReport {
        loop {
            if self.queue.is_empty() {
                match events.recv().await {
                    Some(WatchEvent::Changed(path)) => {
                        self.on_change(&path);
                        continue;
                    }
                    Some(WatchEvent::Shutdown) | None => break,
                }
            }

            let batch = self.queue.drain_pending();
            let build = rebuild(self.orchestrator.clone(), batch, self.reload_tasks());
            tokio::pin!(build);

            let finished = loop {
                tokio::select! {
                    outcome = &mut build => break Some(outcome),
                    event = events.recv() => match event {
                        Some(WatchEvent::Changed(path)) => {
                            self.on_change(&path);
                        }
                        Some(WatchEvent::Shutdown) | None => break None,
                    },
                }
            };

            match finished {
                Some((builds, failed)) => {
                    self.report.builds += builds;
                    self.report.failed_builds += failed;
                    self.absorb_own_writes();
                }
                None => {
                    info!("stopping during a rebuild");
                    break;
                }
            }
        }

        info!(report = ?self.report, "watch session finished");
        self.report
    }
}

/// Run each task of a batch in turn. Returns `(runs, failed runs)`.
async fn rebuild(
    orchestrator: Orchestrator,
    batch: Vec<TaskId>,
    reload_after: Vec<TaskId>,
) -> (usize, usize) {
    let mut failed = 0;
    for task in &batch {
        match orchestrator.run_task(*task).await {
            Ok(summary) if summary.is_success() => {
                if reload_after.contains(task) {
                    if let Some(sync) = &orchestrator.context().live_sync {
                        sync.notify(Notification::Reload);
                    }
                }
            }
            Ok(_) => {
                failed += 1;
                warn!(task = %task, "rebuild failed; still watching");
            }
            Err(e) => {
                failed += 1;
                error!(task = %task, error = %e, "rebuild could not run; still watching");
            }
        }
    }
    (batch.len(), failed)
}

/// Start live-sync (if enabled), watch the source trees and rebuild on
/// change until Ctrl-C.
pub async fn watch(ctx: BuildContext, registry: TaskRegistry) -> Result<SessionReport> {
    let ctx = if ctx.config.sync {
        let handle = LiveSyncHandle::start(&ctx.config.sync_target)?;
        ctx.with_live_sync(handle)
    } else {
        ctx
    };
    let ctx = Arc::new(ctx);

    let bindings = default_bindings(&ctx)?;
    let mut roots: Vec<PathBuf> = bindings.iter().map(|b| b.root().to_path_buf()).collect();
    roots.sort();
    roots.dedup();

    let (tx, rx) = mpsc::unbounded_channel();
    let _watchers = spawn_watchers(&roots, &tx)?;

    let shutdown_tx = tx.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Ctrl-C received; stopping watch");
                let _ = shutdown_tx.send(WatchEvent::Shutdown);
            }
            Err(e) => warn!(error = %e, "failed to listen for Ctrl-C"),
        }
    });
    drop(tx);

    let mut session = WatchSession::new(Orchestrator::new(registry, ctx), bindings);
    session.prime()?;
    info!(roots = ?roots, "watching for changes; press Ctrl-C to stop");

    Ok(session.run(rx).await)
}
