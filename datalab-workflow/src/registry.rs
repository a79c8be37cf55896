use chrono::Utc;
use datalab_core::{
    CoreError, Result, Task, TaskConfig, TaskFilter, TaskId, TaskKind, TaskUpdate,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, RwLock};
use tokio_util::sync::CancellationToken;

/// Snapshot pushed to subscribers after every applied change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskEvent {
    pub task: Task,
}

/// The in-memory record for a single submitted task.
#[derive(Debug)]
struct TaskEntry {
    task: Task,
    /// Submission order, used to break `created_at` ties when listing.
    seq: u64,
    /// Fired when the task is cancelled; the runner and work unit watch it.
    cancel: CancellationToken,
}

/// Authoritative, process-wide store of task state.
///
/// Cloning is cheap and every clone sees the same tasks. Each mutation runs
/// inside one write-lock critical section, so a transition is all-or-nothing
/// and two callers can never both move the same task out of a non-terminal
/// state.
#[derive(Debug, Clone)]
pub struct TaskRegistry {
    inner: Arc<RwLock<HashMap<TaskId, TaskEntry>>>,
    next_seq: Arc<AtomicU64>,
    max_concurrent_tasks: usize,
    events: broadcast::Sender<TaskEvent>,
}

impl TaskRegistry {
    pub fn new(max_concurrent_tasks: usize) -> Self {
        Self::with_event_capacity(max_concurrent_tasks, TaskConfig::default().event_capacity)
    }

    pub fn from_config(config: &TaskConfig) -> Self {
        Self::with_event_capacity(config.max_concurrent_tasks, config.event_capacity)
    }

    fn with_event_capacity(max_concurrent_tasks: usize, event_capacity: usize) -> Self {
        let (events, _) = broadcast::channel(event_capacity.max(1));
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            next_seq: Arc::new(AtomicU64::new(0)),
            max_concurrent_tasks,
            events,
        }
    }

    pub fn max_concurrent_tasks(&self) -> usize {
        self.max_concurrent_tasks
    }

    /// Creates a `Pending` task and returns its fresh id.
    pub async fn submit(&self, kind: TaskKind, params: serde_json::Value) -> Result<TaskId> {
        let task = Task::new(kind, params);
        let task_id = task.id;

        {
            let mut tasks = self.inner.write().await;
            let active = tasks.values().filter(|e| !e.task.is_terminal()).count();
            if active >= self.max_concurrent_tasks {
                tracing::warn!(
                    kind = %kind,
                    active,
                    limit = self.max_concurrent_tasks,
                    "Rejected task submission"
                );
                return Err(CoreError::CapacityExceeded(format!(
                    "{} active tasks already running (limit {})",
                    active, self.max_concurrent_tasks
                )));
            }

            let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
            tasks.insert(
                task_id,
                TaskEntry {
                    task: task.clone(),
                    seq,
                    cancel: CancellationToken::new(),
                },
            );
            self.publish(task);
        }

        tracing::info!(task_id = %task_id, kind = %kind, "Submitted task");
        Ok(task_id)
    }

    pub async fn get(&self, task_id: TaskId) -> Result<Task> {
        self.inner
            .read()
            .await
            .get(&task_id)
            .map(|entry| entry.task.clone())
            .ok_or_else(|| not_found(task_id))
    }

    /// Applies a runner-issued update. Updates to terminal tasks and illegal
    /// moves fail with `InvalidTransition` and leave the task untouched.
    pub async fn update(&self, task_id: TaskId, update: TaskUpdate) -> Result<Task> {
        let task = {
            let mut tasks = self.inner.write().await;
            let entry = tasks.get_mut(&task_id).ok_or_else(|| not_found(task_id))?;
            entry.task.apply(update)?;
            self.publish(entry.task.clone());
            entry.task.clone()
        };

        tracing::debug!(
            task_id = %task_id,
            state = %task.state,
            progress = task.progress,
            "Task updated"
        );
        Ok(task)
    }

    /// Cancels a pending or running task. Already-terminal tasks are left
    /// as they are and the call still succeeds.
    pub async fn cancel(&self, task_id: TaskId) -> Result<()> {
        let cancelled = {
            let mut tasks = self.inner.write().await;
            let entry = tasks.get_mut(&task_id).ok_or_else(|| not_found(task_id))?;
            if entry.task.cancel() {
                entry.cancel.cancel();
                self.publish(entry.task.clone());
                Some(entry.task.clone())
            } else {
                None
            }
        };

        match cancelled {
            Some(task) => {
                tracing::info!(task_id = %task_id, progress = task.progress, "Cancelled task");
            }
            None => tracing::debug!(task_id = %task_id, "Cancel ignored, task already finished"),
        }
        Ok(())
    }

    /// Snapshot of matching tasks, most recently created first.
    pub async fn list(&self, filter: &TaskFilter) -> Vec<Task> {
        let tasks = self.inner.read().await;
        let mut entries: Vec<&TaskEntry> = tasks
            .values()
            .filter(|entry| filter.matches(&entry.task))
            .collect();
        entries.sort_by(|a, b| {
            b.task
                .created_at
                .cmp(&a.task.created_at)
                .then_with(|| b.seq.cmp(&a.seq))
        });

        let limit = filter.limit.unwrap_or(usize::MAX);
        entries
            .into_iter()
            .take(limit)
            .map(|entry| entry.task.clone())
            .collect()
    }

    /// Number of pending or running tasks.
    pub async fn active_count(&self) -> usize {
        self.inner
            .read()
            .await
            .values()
            .filter(|entry| !entry.task.is_terminal())
            .count()
    }

    /// Drops terminal tasks that finished more than `retention` ago.
    pub async fn prune_terminal(&self, retention: Duration) -> usize {
        let cutoff = chrono::Duration::from_std(retention)
            .ok()
            .and_then(|retention| Utc::now().checked_sub_signed(retention));

        let mut tasks = self.inner.write().await;
        let before = tasks.len();
        tasks.retain(|_, entry| {
            match (entry.task.is_terminal(), entry.task.finished_at, cutoff) {
                (true, Some(finished), Some(cutoff)) => finished > cutoff,
                _ => true,
            }
        });
        let removed = before - tasks.len();

        if removed > 0 {
            tracing::info!(removed, "Pruned finished tasks");
        }
        removed
    }

    /// Push notifications for every submit, update and cancel.
    pub fn subscribe(&self) -> broadcast::Receiver<TaskEvent> {
        self.events.subscribe()
    }

    pub(crate) async fn cancellation_token(&self, task_id: TaskId) -> Result<CancellationToken> {
        self.inner
            .read()
            .await
            .get(&task_id)
            .map(|entry| entry.cancel.clone())
            .ok_or_else(|| not_found(task_id))
    }

    /// Must be called with the write lock held so events leave in the
    /// order their changes were applied.
    fn publish(&self, task: Task) {
        // No subscribers is fine.
        let _ = self.events.send(TaskEvent { task });
    }
}

impl Default for TaskRegistry {
    fn default() -> Self {
        Self::from_config(&TaskConfig::default())
    }
}

fn not_found(task_id: TaskId) -> CoreError {
    CoreError::NotFound(format!("Task {} not found", task_id))
}
