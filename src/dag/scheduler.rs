// src/dag/scheduler.rs

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::dag::plan::Plan;
use crate::dag::scheduler_step::{RunSummary, SchedulerStep};
use crate::dag::state_manager::{ReadOnlyStateManager, StateManager};
use crate::dag::task_id::TaskId;
use crate::dag::task_info::{RunState, ScheduledTask, TaskInfo, TaskRunState};
use crate::engine::TaskOutcome;

/// Scheduler holds the immutable plan plus mutable per-run state.
///
/// It is responsible for:
/// - remembering which tasks are part of the current run
/// - deciding when a triggered task is ready (deps satisfied)
/// - recording success and failure
/// - blocking the dependents of a failed task while siblings carry on
#[derive(Debug)]
pub struct Scheduler {
    plan: Plan,
    tasks: BTreeMap<TaskId, TaskInfo>,
    /// Monotonically increasing run ID.
    run_counter: u64,
    /// Currently active run ID, or `None` if there is no active run.
    current_run_id: Option<u64>,
}

impl Scheduler {
    pub fn from_plan(plan: Plan) -> Self {
        let tasks = plan
            .tasks()
            .filter_map(|id| TaskInfo::from_plan(&plan, id).map(|info| (id, info)))
            .collect();

        Self {
            plan,
            tasks,
            run_counter: 0,
            current_run_id: None,
        }
    }

    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    pub fn is_idle(&self) -> bool {
        self.current_run_id.is_none()
    }

    pub fn current_run_id(&self) -> Option<u64> {
        self.current_run_id
    }

    /// Read-only view of the given task's run state.
    pub fn run_state_of(&self, task: TaskId) -> Option<TaskRunState> {
        let info = self.tasks.get(&task)?;
        Some(info.run_state.into())
    }

    /// Tasks participating in the active run; empty when idle.
    pub fn tasks_in_current_run(&self) -> Vec<TaskId> {
        if self.current_run_id.is_none() {
            return Vec::new();
        }
        self.tasks
            .values()
            .filter(|info| info.run_state.is_some())
            .map(|info| info.id)
            .collect()
    }

    /// Whether the dependencies of `task` are satisfied for the current run.
    pub fn deps_satisfied(&self, task: TaskId) -> Option<bool> {
        let info = self.tasks.get(&task)?;
        Some(ReadOnlyStateManager::new(&self.tasks).deps_satisfied_for_info(info))
    }

    /// Start a new run, resetting per-run state but keeping history.
    pub fn start_new_run(&mut self) {
        self.run_counter += 1;
        self.current_run_id = Some(self.run_counter);

        for info in self.tasks.values_mut() {
            info.run_state = None;
        }

        debug!(run_id = self.run_counter, "scheduler: starting new run");
    }

    /// Start a run containing every leaf of the plan; returns the tasks to
    /// dispatch first.
    pub fn start_full_run(&mut self) -> SchedulerStep {
        self.start_new_run();
        for root in self.plan.roots() {
            let mut manager = StateManager::new(&self.plan, &mut self.tasks, self.current_run_id);
            manager.mark_task_and_dependents_pending(root);
        }
        let mut manager = StateManager::new(&self.plan, &mut self.tasks, self.current_run_id);
        let newly_scheduled = manager.collect_new_ready_tasks();
        let run_just_finished = self.maybe_finish_run();

        SchedulerStep {
            newly_scheduled,
            run_just_finished,
            ..SchedulerStep::default()
        }
    }

    pub fn handle_trigger(&mut self, task: TaskId) -> Vec<ScheduledTask> {
        self.trigger_step_internal(task).newly_scheduled
    }

    pub fn handle_completion(&mut self, task: TaskId, outcome: TaskOutcome) -> Vec<ScheduledTask> {
        self.completion_step_internal(task, outcome).newly_scheduled
    }

    /// Manual-step variant of `handle_trigger`.
    pub fn step_trigger(&mut self, task: TaskId) -> SchedulerStep {
        self.trigger_step_internal(task)
    }

    /// Manual-step variant of `handle_completion`.
    pub fn step_completion(&mut self, task: TaskId, outcome: TaskOutcome) -> SchedulerStep {
        self.completion_step_internal(task, outcome)
    }

    pub fn task_ids(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.plan.tasks()
    }

    /// Outcome of the most recent run, by leaf.
    pub fn summary(&self) -> RunSummary {
        let mut summary = RunSummary::default();
        for info in self.tasks.values() {
            match info.run_state {
                Some(RunState::DoneSuccess) => summary.succeeded.push(info.id),
                Some(RunState::DoneFailed) => summary.failed.push((
                    info.id,
                    info.last_error.clone().unwrap_or_default(),
                )),
                Some(RunState::Blocked) => summary.blocked.push(info.id),
                Some(RunState::Pending) | Some(RunState::Running) | None => {}
            }
        }
        summary
    }

    /// Clear `current_run_id` once every task is terminal. Returns `true`
    /// if this call finished the run.
    fn maybe_finish_run(&mut self) -> bool {
        if self.current_run_id.is_none() {
            return false;
        }

        let manager = StateManager::new(&self.plan, &mut self.tasks, self.current_run_id);
        if manager.all_tasks_terminal() {
            info!(run_id = self.current_run_id, "scheduler: all tasks terminal; run finished");
            self.current_run_id = None;
            true
        } else {
            false
        }
    }

    fn trigger_step_internal(&mut self, task: TaskId) -> SchedulerStep {
        if self.current_run_id.is_none() {
            debug!(task = %task, "trigger with no active run; starting a new run");
            self.start_new_run();
        }

        if self.tasks.contains_key(&task) {
            let mut manager = StateManager::new(&self.plan, &mut self.tasks, self.current_run_id);
            manager.mark_task_and_dependents_pending(task);
        } else {
            warn!(task = %task, "trigger for task outside the plan; ignoring");
        }

        let mut manager = StateManager::new(&self.plan, &mut self.tasks, self.current_run_id);
        let newly_scheduled = manager.collect_new_ready_tasks();
        let run_just_finished = self.maybe_finish_run();

        SchedulerStep {
            newly_scheduled,
            run_just_finished,
            ..SchedulerStep::default()
        }
    }

    fn completion_step_internal(&mut self, task: TaskId, outcome: TaskOutcome) -> SchedulerStep {
        let Some(run_id) = self.current_run_id else {
            warn!(task = %task, "completion with no active run; ignoring");
            return SchedulerStep::default();
        };

        let mut step = SchedulerStep::default();

        match self.tasks.get_mut(&task) {
            Some(info) if info.run_state == Some(RunState::Running) => match outcome {
                TaskOutcome::Success => {
                    info.run_state = Some(RunState::DoneSuccess);
                    info.last_successful_run = Some(run_id);
                    info.last_error = None;
                    debug!(task = %info.id, run_id, "task completed successfully");
                    let mut manager =
                        StateManager::new(&self.plan, &mut self.tasks, self.current_run_id);
                    step.newly_scheduled = manager.collect_new_ready_tasks();
                }
                TaskOutcome::Failed(message) => {
                    info.run_state = Some(RunState::DoneFailed);
                    info.last_failed_run = Some(run_id);
                    warn!(
                        task = %info.id,
                        run_id,
                        error = %message,
                        "task failed; blocking its dependents in this run"
                    );
                    info.last_error = Some(message);
                    step.newly_failed.push(task);
                    let mut manager =
                        StateManager::new(&self.plan, &mut self.tasks, self.current_run_id);
                    step.newly_blocked = manager.mark_dependents_blocked(task);
                }
            },
            Some(info) => {
                warn!(task = %task, state = ?info.run_state, "completion for task that is not running; ignoring");
            }
            None => {
                warn!(task = %task, "completion for unknown task; ignoring");
            }
        }

        step.run_just_finished = self.maybe_finish_run();
        step
    }
}
