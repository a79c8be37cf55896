use async_trait::async_trait;
use datalab_core::{Result, TaskId, TaskKind};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Everything a work unit gets to see about the task it is driving.
#[derive(Debug, Clone)]
pub struct WorkContext {
    pub task_id: TaskId,
    pub kind: TaskKind,
    pub params: serde_json::Value,
    pub progress: ProgressReporter,
    /// Fired on cancellation or timeout. Work should stop soon after.
    pub cancel: CancellationToken,
}

impl WorkContext {
    pub fn new(
        task_id: TaskId,
        kind: TaskKind,
        params: serde_json::Value,
        progress: ProgressReporter,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            task_id,
            kind,
            params,
            progress,
            cancel,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// A unit of asynchronous work driven by the runner: it reports progress
/// while running and resolves with a result payload or an error.
#[async_trait]
pub trait Work: Send + Sync {
    async fn run(&self, ctx: WorkContext) -> Result<serde_json::Value>;
    fn name(&self) -> &str;
}

/// Sending half of a task's progress stream. Reports are delivered to the
/// runner in the order they are made.
#[derive(Debug, Clone)]
pub struct ProgressReporter {
    task_id: TaskId,
    tx: mpsc::UnboundedSender<f64>,
}

impl ProgressReporter {
    /// Reporter plus the receiving end, for driving work outside a runner.
    pub fn channel(task_id: TaskId) -> (Self, mpsc::UnboundedReceiver<f64>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { task_id, tx }, rx)
    }

    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    /// Queues a progress value in percent. Returns `false` once nobody is
    /// listening any more, e.g. after the task was cancelled.
    pub fn report(&self, percent: f64) -> bool {
        self.tx.send(percent).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
