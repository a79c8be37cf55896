use datalab_core::{CoreError, Result, TaskError, TaskId, TaskUpdate};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::registry::TaskRegistry;
use crate::work::{ProgressReporter, Work, WorkContext};

/// Handle to the background loop driving one task.
#[derive(Debug)]
pub struct TaskHandle {
    task_id: TaskId,
    handle: JoinHandle<()>,
}

impl TaskHandle {
    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits until the task reached a terminal state and the loop exited.
    pub async fn join(self) -> Result<()> {
        self.handle
            .await
            .map_err(|e| CoreError::Internal(format!("Task {} driver panicked: {}", self.task_id, e)))
    }
}

enum Outcome {
    Finished(Result<serde_json::Value>),
    Cancelled,
    TimedOut(Duration),
}

/// Drives tasks from `Pending` to a terminal state, forwarding progress
/// from the work unit into the registry.
#[derive(Debug, Clone)]
pub struct TaskRunner {
    registry: TaskRegistry,
    default_timeout: Option<Duration>,
}

impl TaskRunner {
    pub fn new(registry: TaskRegistry) -> Self {
        Self {
            registry,
            default_timeout: None,
        }
    }

    pub fn with_default_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    /// Moves the task to `Running` and launches `work` in the background.
    /// Returns as soon as the work is spawned.
    pub async fn start(&self, task_id: TaskId, work: Arc<dyn Work>) -> Result<TaskHandle> {
        self.start_with_timeout(task_id, work, self.default_timeout).await
    }

    pub async fn start_with_timeout(
        &self,
        task_id: TaskId,
        work: Arc<dyn Work>,
        timeout: Option<Duration>,
    ) -> Result<TaskHandle> {
        let cancel = self.registry.cancellation_token(task_id).await?;
        let task = self.registry.update(task_id, TaskUpdate::Start).await?;

        let (progress, progress_rx) = ProgressReporter::channel(task_id);
        let ctx = WorkContext::new(
            task_id,
            task.kind,
            task.params.clone(),
            progress,
            cancel.child_token(),
        );

        tracing::info!(
            task_id = %task_id,
            kind = %task.kind,
            work = work.name(),
            timeout = ?timeout,
            "Started task"
        );

        let registry = self.registry.clone();
        let handle = tokio::spawn(drive(registry, work, ctx, progress_rx, cancel, timeout));

        Ok(TaskHandle { task_id, handle })
    }
}

async fn drive(
    registry: TaskRegistry,
    work: Arc<dyn Work>,
    ctx: WorkContext,
    mut progress_rx: mpsc::UnboundedReceiver<f64>,
    cancel: CancellationToken,
    timeout: Option<Duration>,
) {
    let task_id = ctx.task_id;
    let work_token = ctx.cancel.clone();

    let run = work.run(ctx);
    tokio::pin!(run);

    let deadline = async {
        match timeout {
            Some(limit) => {
                tokio::time::sleep(limit).await;
                limit
            }
            None => std::future::pending().await,
        }
    };
    tokio::pin!(deadline);

    let outcome = loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break Outcome::Cancelled,
            Some(percent) = progress_rx.recv() => {
                apply_progress(&registry, task_id, percent).await;
            }
            result = &mut run => break Outcome::Finished(result),
            limit = &mut deadline => break Outcome::TimedOut(limit),
        }
    };

    match outcome {
        Outcome::Finished(result) => {
            // Reports queued before the work resolved still count.
            while let Ok(percent) = progress_rx.try_recv() {
                apply_progress(&registry, task_id, percent).await;
            }

            let update = match result {
                Ok(value) => TaskUpdate::Succeed(value),
                Err(err) => {
                    tracing::warn!(task_id = %task_id, error = %err, "Task work failed");
                    TaskUpdate::Fail(TaskError::work_failed(failure_message(err)))
                }
            };
            finish(&registry, task_id, update).await;
        }
        Outcome::TimedOut(limit) => {
            work_token.cancel();
            tracing::warn!(task_id = %task_id, limit = ?limit, "Task timed out");
            finish(&registry, task_id, TaskUpdate::Fail(TaskError::timeout(limit))).await;
        }
        Outcome::Cancelled => {
            tracing::info!(task_id = %task_id, "Stopped driving cancelled task");
        }
    }
}

async fn apply_progress(registry: &TaskRegistry, task_id: TaskId, percent: f64) {
    if let Err(err) = registry.update(task_id, TaskUpdate::Progress(percent)).await {
        tracing::debug!(task_id = %task_id, percent, error = %err, "Discarded progress report");
    }
}

async fn finish(registry: &TaskRegistry, task_id: TaskId, update: TaskUpdate) {
    match registry.update(task_id, update).await {
        Ok(task) => tracing::info!(task_id = %task_id, state = %task.state, "Task finished"),
        // Lost the race against a cancel; the cancelled state stands.
        Err(err) => tracing::debug!(task_id = %task_id, error = %err, "Discarded final update"),
    }
}

fn failure_message(err: CoreError) -> String {
    match err {
        CoreError::WorkFailed(message) => message,
        other => other.to_string(),
    }
}
