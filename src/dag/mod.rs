// src/dag/mod.rs

//! Task graph and scheduling.
//!
//! - [`task_id`] names every task and the leaf actions behind them.
//! - [`registry`] holds the task definitions and expands a task into a plan.
//! - [`plan`] is the DAG of leaf actions for one invocation.
//! - [`scheduler`] contains the per-run state machine that decides which
//!   leaves are ready to run, and blocks dependents of failures.
//! - [`task_info`], [`scheduler_step`] and [`state_manager`] support it.

pub mod plan;
pub mod registry;
pub mod scheduler;
pub mod scheduler_step;
pub mod state_manager;
pub mod task_id;
pub mod task_info;

pub use plan::Plan;
pub use registry::{TaskBody, TaskDef, TaskRegistry, standard_defs};
pub use scheduler::Scheduler;
pub use scheduler_step::{RunSummary, SchedulerStep};
pub use task_id::{Action, TaskId};
pub use task_info::{ScheduledTask, TaskRunState};
