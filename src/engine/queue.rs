// src/engine/queue.rs

use std::collections::BTreeSet;

use tracing::debug;

use crate::dag::TaskId;

/// Triggers that arrive while a build is already running.
///
/// Triggers coalesce: however many times a task is triggered during one
/// build, it runs once afterwards. Draining hands back every queued task as
/// a single batch for the next build.
#[derive(Debug, Default)]
pub struct TriggerQueue {
    pending: BTreeSet<TaskId>,
    /// Triggers recorded since creation, including coalesced duplicates.
    received: usize,
}

impl TriggerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Number of distinct queued tasks.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn received(&self) -> usize {
        self.received
    }

    pub fn record_trigger(&mut self, task: TaskId) {
        self.received += 1;
        let inserted = self.pending.insert(task);
        debug!(task = %task, inserted, "queued trigger");
    }

    /// Take every queued task, in `TaskId` order.
    pub fn drain_pending(&mut self) -> Vec<TaskId> {
        let drained: Vec<TaskId> = std::mem::take(&mut self.pending).into_iter().collect();
        if !drained.is_empty() {
            debug!(tasks = ?drained, "drained queued triggers");
        }
        drained
    }
}
