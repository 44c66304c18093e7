// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! The core consumes [`RuntimeEvent`]s and produces an updated state plus a
//! list of commands for the IO shell (`engine::runtime::Runtime`), which
//! reads the channel, hands tasks to the executor and stops on exit.
//!
//! No Tokio, channels, filesystem or processes in here.

use crate::dag::{RunSummary, Scheduler};
use crate::engine::event_handlers::{CoreStep, handle_run_request, handle_task_completion};
use crate::engine::{RuntimeEvent, RuntimeOptions};

#[derive(Debug)]
pub struct CoreRuntime {
    scheduler: Scheduler,
    options: RuntimeOptions,
}

impl CoreRuntime {
    pub fn new(scheduler: Scheduler, options: RuntimeOptions) -> Self {
        Self { scheduler, options }
    }

    pub fn is_idle(&self) -> bool {
        self.scheduler.is_idle()
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Outcome of the latest run so far.
    pub fn summary(&self) -> RunSummary {
        self.scheduler.summary()
    }

    /// Handle a single runtime event, returning the commands for the shell.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::RunRequested => handle_run_request(&mut self.scheduler, &self.options),
            RuntimeEvent::TaskCompleted { task, outcome } => {
                handle_task_completion(&mut self.scheduler, &self.options, task, outcome)
            }
            RuntimeEvent::ShutdownRequested => CoreStep {
                commands: Vec::new(),
                keep_running: false,
            },
        }
    }
}
