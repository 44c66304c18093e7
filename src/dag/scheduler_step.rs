// src/dag/scheduler_step.rs

//! Step-by-step execution result types for the scheduler.

use crate::dag::task_id::TaskId;
use crate::dag::task_info::ScheduledTask;

/// Structured result of a single scheduler "step".
///
/// Tests step the scheduler by hand and assert on what changed.
#[derive(Debug, Clone, Default)]
pub struct SchedulerStep {
    /// Tasks that became ready to run as a result of this step.
    pub newly_scheduled: Vec<ScheduledTask>,
    /// The task that failed in this step, if any.
    pub newly_failed: Vec<TaskId>,
    /// Dependents that will not run because of that failure.
    pub newly_blocked: Vec<TaskId>,
    /// Whether this step finished the current run.
    pub run_just_finished: bool,
}

/// Final result of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: Vec<TaskId>,
    /// Failed leaves with their error message.
    pub failed: Vec<(TaskId, String)>,
    /// Leaves skipped because a dependency failed.
    pub blocked: Vec<TaskId>,
}

impl RunSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.blocked.is_empty()
    }

    pub fn failed_ids(&self) -> Vec<TaskId> {
        self.failed.iter().map(|(id, _)| *id).collect()
    }
}
