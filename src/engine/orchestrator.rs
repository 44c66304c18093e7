// src/engine/orchestrator.rs

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, info};

use crate::dag::{Plan, RunSummary, Scheduler, TaskId, TaskRegistry};
use crate::engine::{CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions};
use crate::errors::{Error, Result};
use crate::exec::{ActionExecutor, BuildContext, ExecutorBackend};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Run every leaf of `plan` once with `executor`, returning when the run is
/// over.
///
/// `tx`/`rx` are the runtime's event channel; the executor must report
/// completions on `tx`.
pub async fn run_plan<E: ExecutorBackend>(
    plan: Plan,
    executor: E,
    tx: mpsc::Sender<RuntimeEvent>,
    rx: mpsc::Receiver<RuntimeEvent>,
) -> Result<RunSummary> {
    let core = CoreRuntime::new(Scheduler::from_plan(plan), RuntimeOptions::default());
    tx.send(RuntimeEvent::RunRequested)
        .await
        .map_err(Error::from)?;
    drop(tx);
    Runtime::new(core, rx, executor).run().await
}

/// Runs named tasks against one project.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    registry: TaskRegistry,
    ctx: Arc<BuildContext>,
}

impl Orchestrator {
    pub fn new(registry: TaskRegistry, ctx: Arc<BuildContext>) -> Self {
        Self { registry, ctx }
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    pub fn context(&self) -> &Arc<BuildContext> {
        &self.ctx
    }

    pub fn plan(&self, task: TaskId) -> Result<Plan> {
        self.registry.plan(task)
    }

    /// Run `task` and everything it expands to. Failures of individual
    /// actions are reported in the summary, not as an error.
    pub async fn run_task(&self, task: TaskId) -> Result<RunSummary> {
        let plan = self.plan(task)?;
        info!(task = %task, leaves = plan.len(), "starting task");

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let executor = ActionExecutor::new(self.ctx.clone(), tx.clone());
        let summary = run_plan(plan, executor, tx, rx).await?;

        for (leaf, message) in &summary.failed {
            error!(task = %leaf, "{message}");
        }
        if !summary.blocked.is_empty() {
            error!(task = %task, blocked = ?summary.blocked, "tasks skipped after failure");
        }
        if summary.is_success() {
            info!(task = %task, "task finished");
        } else {
            error!(task = %task, failed = summary.failed.len(), "task failed");
        }
        Ok(summary)
    }
}
