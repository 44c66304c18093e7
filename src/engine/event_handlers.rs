// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use tracing::warn;

use crate::dag::{ScheduledTask, Scheduler, TaskId};
use crate::engine::{RuntimeOptions, TaskOutcome};

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Send these tasks to the executor.
    DispatchTasks(Vec<ScheduledTask>),
    /// The run is over and the runtime should stop.
    RequestExit,
}

/// Decision returned by the core after handling a single event.
#[derive(Debug, Clone)]
pub struct CoreStep {
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

/// Start a run of the whole plan. Ignored while a run is active.
pub fn handle_run_request(scheduler: &mut Scheduler, options: &RuntimeOptions) -> CoreStep {
    if !scheduler.is_idle() {
        warn!(run_id = scheduler.current_run_id(), "run requested while a run is active; ignoring");
        return CoreStep {
            commands: Vec::new(),
            keep_running: true,
        };
    }

    let step = scheduler.start_full_run();
    let mut commands = Vec::new();
    if !step.newly_scheduled.is_empty() {
        commands.push(CoreCommand::DispatchTasks(step.newly_scheduled));
    }

    finish(commands, scheduler, options)
}

pub fn handle_task_completion(
    scheduler: &mut Scheduler,
    options: &RuntimeOptions,
    task: TaskId,
    outcome: TaskOutcome,
) -> CoreStep {
    let mut commands = Vec::new();

    let newly_ready = scheduler.handle_completion(task, outcome);
    if !newly_ready.is_empty() {
        commands.push(CoreCommand::DispatchTasks(newly_ready));
    }

    finish(commands, scheduler, options)
}

/// Append `RequestExit` when the run is over and the options say so.
fn finish(
    mut commands: Vec<CoreCommand>,
    scheduler: &Scheduler,
    options: &RuntimeOptions,
) -> CoreStep {
    let mut keep_running = true;
    if options.exit_when_idle && scheduler.is_idle() {
        keep_running = false;
        commands.push(CoreCommand::RequestExit);
    }
    CoreStep {
        commands,
        keep_running,
    }
}
