// src/engine/mod.rs

//! Orchestration engine.
//!
//! This module ties together:
//! - the plan scheduler
//! - the main runtime event loop that reacts to:
//!   - run requests
//!   - task completion events
//!   - shutdown signals
//! - the trigger queue used by watch mode for changes arriving mid-build
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`]. [`orchestrator`] wires them to a plan and an
//! executor.

use crate::dag::TaskId;

/// Outcome of a leaf action for the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    /// Failed with a human-readable reason.
    Failed(String),
}

/// Runtime options used by both the core and the async shell.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeOptions {
    /// Exit the runtime once the run is finished.
    pub exit_when_idle: bool,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            exit_when_idle: true,
        }
    }
}

/// Events flowing into the runtime.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// Start a run of the whole plan.
    RunRequested,
    /// A leaf action finished.
    TaskCompleted { task: TaskId, outcome: TaskOutcome },
    /// Stop without waiting for running actions (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod core;
pub mod event_handlers;
pub mod orchestrator;
pub mod queue;
pub mod runtime;

pub use core::CoreRuntime;
pub use event_handlers::{CoreCommand, CoreStep};
pub use orchestrator::{Orchestrator, run_plan};
pub use queue::TriggerQueue;
pub use runtime::Runtime;
