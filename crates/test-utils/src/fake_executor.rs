use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use assetflow::dag::{ScheduledTask, TaskId};
use assetflow::engine::{RuntimeEvent, TaskOutcome};
use assetflow::errors::Result;
use assetflow::exec::ExecutorBackend;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mark {
    Started(TaskId),
    Finished(TaskId),
}

/// Shared, ordered record of what the fake executor did.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    marks: Arc<Mutex<Vec<Mark>>>,
}

impl Timeline {
    fn push(&self, mark: Mark) {
        self.marks.lock().unwrap().push(mark);
    }

    pub fn marks(&self) -> Vec<Mark> {
        self.marks.lock().unwrap().clone()
    }

    pub fn started(&self) -> Vec<TaskId> {
        self.marks()
            .into_iter()
            .filter_map(|m| match m {
                Mark::Started(id) => Some(id),
                Mark::Finished(_) => None,
            })
            .collect()
    }

    pub fn position(&self, mark: Mark) -> Option<usize> {
        self.marks().iter().position(|m| *m == mark)
    }

    /// `a` finished before `b` started.
    pub fn finished_before_start(&self, a: TaskId, b: TaskId) -> bool {
        match (
            self.position(Mark::Finished(a)),
            self.position(Mark::Started(b)),
        ) {
            (Some(fa), Some(sb)) => fa < sb,
            _ => false,
        }
    }
}

/// Executor for engine tests.
///
/// - records a start/finish timeline
/// - completes each task after its configured delay (default: immediately)
/// - reports configured tasks as failed
pub struct FakeExecutor {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    timeline: Timeline,
    failures: HashMap<TaskId, String>,
    delays: HashMap<TaskId, Duration>,
}

impl FakeExecutor {
    pub fn new(runtime_tx: mpsc::Sender<RuntimeEvent>) -> Self {
        Self {
            runtime_tx,
            timeline: Timeline::default(),
            failures: HashMap::new(),
            delays: HashMap::new(),
        }
    }

    pub fn failing(mut self, task: TaskId, message: &str) -> Self {
        self.failures.insert(task, message.to_string());
        self
    }

    pub fn delayed(mut self, task: TaskId, delay: Duration) -> Self {
        self.delays.insert(task, delay);
        self
    }

    pub fn timeline(&self) -> Timeline {
        self.timeline.clone()
    }
}

impl ExecutorBackend for FakeExecutor {
    fn spawn_ready_tasks(
        &mut self,
        tasks: Vec<ScheduledTask>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.runtime_tx.clone();
        let timeline = self.timeline.clone();
        let failures = self.failures.clone();
        let delays = self.delays.clone();

        Box::pin(async move {
            for t in tasks {
                timeline.push(Mark::Started(t.id));

                let tx = tx.clone();
                let timeline = timeline.clone();
                let outcome = match failures.get(&t.id) {
                    Some(msg) => TaskOutcome::Failed(msg.clone()),
                    None => TaskOutcome::Success,
                };
                let delay = delays.get(&t.id).copied().unwrap_or_default();

                tokio::spawn(async move {
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    timeline.push(Mark::Finished(t.id));
                    let _ = tx
                        .send(RuntimeEvent::TaskCompleted {
                            task: t.id,
                            outcome,
                        })
                        .await;
                });
            }
            Ok(())
        })
    }
}
