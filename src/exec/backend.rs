// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! The runtime talks to an `ExecutorBackend` instead of running actions
//! itself, so tests can swap in a fake that records dispatches and emits
//! `TaskCompleted` events on its own schedule.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::dag::ScheduledTask;
use crate::engine::{RuntimeEvent, TaskOutcome};
use crate::errors::Result;
use crate::exec::BuildContext;

/// How scheduled tasks are executed.
pub trait ExecutorBackend: Send {
    /// Start the given tasks. Completion is reported later as
    /// `RuntimeEvent::TaskCompleted`, not through the returned future.
    fn spawn_ready_tasks(
        &mut self,
        tasks: Vec<ScheduledTask>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Production backend: runs each action on Tokio's blocking pool.
#[derive(Debug, Clone)]
pub struct ActionExecutor {
    ctx: Arc<BuildContext>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
}

impl ActionExecutor {
    pub fn new(ctx: Arc<BuildContext>, runtime_tx: mpsc::Sender<RuntimeEvent>) -> Self {
        Self { ctx, runtime_tx }
    }
}

impl ExecutorBackend for ActionExecutor {
    fn spawn_ready_tasks(
        &mut self,
        tasks: Vec<ScheduledTask>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let ctx = self.ctx.clone();
        let tx = self.runtime_tx.clone();

        Box::pin(async move {
            for task in tasks {
                let ctx = ctx.clone();
                let tx = tx.clone();
                tokio::spawn(async move {
                    let ScheduledTask { id, action, run_id } = task;
                    debug!(task = %id, run_id, %action, "action started");

                    let joined = tokio::task::spawn_blocking(move || action.execute(&ctx)).await;
                    let outcome = match joined {
                        Ok(Ok(())) => TaskOutcome::Success,
                        Ok(Err(e)) => TaskOutcome::Failed(format!("{e:#}")),
                        Err(e) => TaskOutcome::Failed(format!("action panicked: {e}")),
                    };

                    debug!(task = %id, run_id, ?outcome, "action finished");
                    if tx
                        .send(RuntimeEvent::TaskCompleted { task: id, outcome })
                        .await
                        .is_err()
                    {
                        warn!(task = %id, "runtime gone; dropping completion");
                    }
                });
            }
            Ok(())
        })
    }
}
