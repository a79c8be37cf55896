use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use super::ids::TaskId;
use crate::error::{CoreError, Result};

/// Progress of a task that finished successfully.
pub const COMPLETE_PROGRESS: f64 = 100.0;

/// Ceiling for progress while a task is still running. Reaching 100 is
/// reserved for the `Succeeded` transition.
pub const MAX_RUNNING_PROGRESS: f64 = 99.0;

// ===== Task Kind =====

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum TaskKind {
    Generation,
    MiningAnalysis,
    PipelineRun,
}

impl TaskKind {
    pub const ALL: [TaskKind; 3] = [
        TaskKind::Generation,
        TaskKind::MiningAnalysis,
        TaskKind::PipelineRun,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Generation => "generation",
            TaskKind::MiningAnalysis => "mining-analysis",
            TaskKind::PipelineRun => "pipeline-run",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        TaskKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CoreError::Validation(format!("Unknown task kind: {}", s)))
    }
}

// ===== Task State =====

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    Pending,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl TaskState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskState::Succeeded | TaskState::Failed | TaskState::Cancelled
        )
    }

    pub fn is_running(&self) -> bool {
        matches!(self, TaskState::Running)
    }

    pub fn is_successful(&self) -> bool {
        matches!(self, TaskState::Succeeded)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskState::Pending => "pending",
            TaskState::Running => "running",
            TaskState::Succeeded => "succeeded",
            TaskState::Failed => "failed",
            TaskState::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

// ===== Task Error =====

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TaskErrorKind {
    WorkFailed,
    Timeout,
}

/// Why a task ended in `Failed`. Stays readable on the task after the fact.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TaskError {
    pub kind: TaskErrorKind,
    pub message: String,
}

impl TaskError {
    pub fn work_failed(message: impl Into<String>) -> Self {
        Self {
            kind: TaskErrorKind::WorkFailed,
            message: message.into(),
        }
    }

    pub fn timeout(limit: Duration) -> Self {
        Self {
            kind: TaskErrorKind::Timeout,
            message: format!("Task exceeded its running time limit of {:?}", limit),
        }
    }
}

impl From<TaskError> for CoreError {
    fn from(err: TaskError) -> Self {
        match err.kind {
            TaskErrorKind::WorkFailed => CoreError::WorkFailed(err.message),
            TaskErrorKind::Timeout => CoreError::Timeout(err.message),
        }
    }
}

// ===== Task Update =====

/// A change the runner asks the registry to apply to one task.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskUpdate {
    Start,
    Progress(f64),
    Succeed(serde_json::Value),
    Fail(TaskError),
}

impl TaskUpdate {
    fn name(&self) -> &'static str {
        match self {
            TaskUpdate::Start => "start",
            TaskUpdate::Progress(_) => "progress",
            TaskUpdate::Succeed(_) => "succeed",
            TaskUpdate::Fail(_) => "fail",
        }
    }
}

// ===== Task =====

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: TaskId,
    pub kind: TaskKind,
    pub state: TaskState,
    pub progress: f64,
    pub params: serde_json::Value,
    pub result: Option<serde_json::Value>,
    pub error: Option<TaskError>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(kind: TaskKind, params: serde_json::Value) -> Self {
        let now = Utc::now();
        Self {
            id: TaskId::new(),
            kind,
            state: TaskState::Pending,
            progress: 0.0,
            params,
            result: None,
            error: None,
            created_at: now,
            updated_at: now,
            started_at: None,
            finished_at: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    /// Applies one state-machine step. On error the task is left untouched.
    pub fn apply(&mut self, update: TaskUpdate) -> Result<()> {
        if self.state.is_terminal() {
            return Err(self.rejected(&update));
        }

        let now = Utc::now();
        match (self.state, update) {
            (TaskState::Pending, TaskUpdate::Start) => {
                self.state = TaskState::Running;
                self.progress = 0.0;
                self.started_at = Some(now);
            }
            (TaskState::Running, TaskUpdate::Progress(value)) => {
                if value.is_nan() {
                    return Err(CoreError::Validation(format!(
                        "Task {} received a NaN progress report",
                        self.id
                    )));
                }
                let value = value.clamp(0.0, COMPLETE_PROGRESS).min(MAX_RUNNING_PROGRESS);
                if value < self.progress {
                    return Err(CoreError::InvalidTransition(format!(
                        "Task {} progress cannot go back from {:.1} to {:.1}",
                        self.id, self.progress, value
                    )));
                }
                self.progress = value;
            }
            (TaskState::Running, TaskUpdate::Succeed(result)) => {
                self.state = TaskState::Succeeded;
                self.progress = COMPLETE_PROGRESS;
                self.result = Some(result);
                self.finished_at = Some(now);
            }
            (TaskState::Running, TaskUpdate::Fail(error)) => {
                self.state = TaskState::Failed;
                self.error = Some(error);
                self.finished_at = Some(now);
            }
            (_, update) => return Err(self.rejected(&update)),
        }

        self.updated_at = now;
        Ok(())
    }

    /// Moves a pending or running task to `Cancelled`. Returns `false` when
    /// the task was already terminal and nothing changed.
    pub fn cancel(&mut self) -> bool {
        if self.state.is_terminal() {
            return false;
        }
        let now = Utc::now();
        self.state = TaskState::Cancelled;
        self.finished_at = Some(now);
        self.updated_at = now;
        true
    }

    fn rejected(&self, update: &TaskUpdate) -> CoreError {
        CoreError::InvalidTransition(format!(
            "Task {} cannot {} while {}",
            self.id,
            update.name(),
            self.state
        ))
    }
}

// ===== Task Filter =====

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TaskFilter {
    pub state: Option<TaskState>,
    pub kind: Option<TaskKind>,
    pub limit: Option<usize>,
}

impl TaskFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(mut self, state: TaskState) -> Self {
        self.state = Some(state);
        self
    }

    pub fn with_kind(mut self, kind: TaskKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn matches(&self, task: &Task) -> bool {
        self.state.map_or(true, |state| task.state == state)
            && self.kind.map_or(true, |kind| task.kind == kind)
    }
}
