// src/dag/state_manager.rs

//! Per-run state management for tasks in the scheduler.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, info, warn};

use crate::dag::plan::Plan;
use crate::dag::task_id::TaskId;
use crate::dag::task_info::{RunState, ScheduledTask, TaskInfo};

/// Manages per-run state transitions for tasks.
pub struct StateManager<'a> {
    plan: &'a Plan,
    tasks: &'a mut BTreeMap<TaskId, TaskInfo>,
    current_run_id: Option<u64>,
}

impl<'a> StateManager<'a> {
    pub fn new(
        plan: &'a Plan,
        tasks: &'a mut BTreeMap<TaskId, TaskInfo>,
        current_run_id: Option<u64>,
    ) -> Self {
        Self {
            plan,
            tasks,
            current_run_id,
        }
    }

    /// Include a triggered task and all its downstream dependents in this run.
    ///
    /// Tasks already participating in this run keep their current state.
    pub fn mark_task_and_dependents_pending(&mut self, root: TaskId) {
        let mut stack = vec![root];
        let mut visited = HashSet::new();

        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }

            if let Some(info) = self.tasks.get_mut(&id) {
                if info.run_state.is_none() {
                    info.run_state = Some(RunState::Pending);
                    debug!(task = %info.id, "marked Pending for this run");
                }
                stack.extend(self.plan.dependents_of(id).iter().copied());
            } else {
                warn!(task = %id, "node in plan not present in tasks map");
            }
        }
    }

    pub fn deps_satisfied_for_info(&self, info: &TaskInfo) -> bool {
        ReadOnlyStateManager::new(self.tasks).deps_satisfied_for_info(info)
    }

    /// Mark every pending dependent (transitively) of a failed task as
    /// `Blocked` for this run. Returns the newly blocked tasks.
    pub fn mark_dependents_blocked(&mut self, failed_task: TaskId) -> Vec<TaskId> {
        let mut stack: Vec<TaskId> = self.plan.dependents_of(failed_task).to_vec();
        let mut newly_blocked = Vec::new();

        while let Some(id) = stack.pop() {
            if let Some(info) = self.tasks.get_mut(&id) {
                if info.run_state == Some(RunState::Pending) {
                    info.run_state = Some(RunState::Blocked);
                    debug!(
                        task = %info.id,
                        upstream = %failed_task,
                        "blocked by upstream failure"
                    );
                    newly_blocked.push(info.id);
                    stack.extend(self.plan.dependents_of(id).iter().copied());
                }
            }
        }

        newly_blocked
    }

    /// Collect tasks that are `Pending` and whose dependencies are satisfied,
    /// mark them as `Running`, and return them as `ScheduledTask`s.
    pub fn collect_new_ready_tasks(&mut self) -> Vec<ScheduledTask> {
        let candidates: Vec<TaskId> = self
            .tasks
            .values()
            .filter(|info| {
                info.run_state == Some(RunState::Pending) && self.deps_satisfied_for_info(info)
            })
            .map(|info| info.id)
            .collect();

        let mut ready = Vec::with_capacity(candidates.len());
        for id in candidates {
            if let Some(info) = self.tasks.get_mut(&id) {
                let is_rerun = info.last_successful_run.is_some() || info.last_failed_run.is_some();
                info!(
                    task = %info.id,
                    action = %info.action,
                    run_id = self.current_run_id,
                    rerun = is_rerun,
                    "scheduling task"
                );

                info.run_state = Some(RunState::Running);
                ready.push(ScheduledTask::from_task_info(
                    info,
                    self.current_run_id.unwrap_or(0),
                ));
            }
        }

        ready
    }

    pub fn all_tasks_terminal(&self) -> bool {
        self.tasks
            .values()
            .all(|info| info.run_state.is_none_or(RunState::is_terminal))
    }
}

/// Dependency check over a shared borrow of the tasks map.
pub struct ReadOnlyStateManager<'a> {
    tasks: &'a BTreeMap<TaskId, TaskInfo>,
}

impl<'a> ReadOnlyStateManager<'a> {
    pub fn new(tasks: &'a BTreeMap<TaskId, TaskInfo>) -> Self {
        Self { tasks }
    }

    /// All dependencies succeeded in this run, or (for dependencies outside
    /// this run) in an earlier one.
    pub fn deps_satisfied_for_info(&self, info: &TaskInfo) -> bool {
        info.deps.iter().all(|dep_id| {
            let Some(dep) = self.tasks.get(dep_id) else {
                warn!(task = %info.id, dep = %dep_id, "dependency missing from tasks map");
                return false;
            };
            match dep.run_state {
                Some(RunState::DoneSuccess) => true,
                Some(_) => false,
                None => dep.last_successful_run.is_some(),
            }
        })
    }
}
