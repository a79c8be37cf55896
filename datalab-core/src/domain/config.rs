use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

use crate::error::Result;

// ===== Task Configuration =====

/// Limits and pacing for the task registry and runner.
///
/// The defaults mirror the single-slot dashboard: one active task at a time,
/// a progress tick every 500 ms, and simulated steps of at most 15 points.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
#[serde(default)]
pub struct TaskConfig {
    /// Maximum number of pending or running tasks at once.
    #[validate(range(min = 1))]
    pub max_concurrent_tasks: usize,

    /// Interval between simulated progress reports.
    #[validate(range(min = 1))]
    pub report_interval_ms: u64,

    /// Upper bound of one simulated progress step.
    #[validate(range(exclusive_min = 0.0, max = 100.0))]
    pub max_progress_step: f64,

    /// Force-fail a running task after this many seconds. `None` disables it.
    pub timeout_secs: Option<u64>,

    /// How long finished tasks stay queryable before pruning.
    pub retention_secs: u64,

    /// How often the retention sweep runs.
    #[validate(range(min = 1))]
    pub prune_interval_secs: u64,

    /// Buffer size of the task event broadcast channel.
    #[validate(range(min = 1))]
    pub event_capacity: usize,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            max_concurrent_tasks: 1,
            report_interval_ms: 500,
            max_progress_step: 15.0,
            timeout_secs: None,
            retention_secs: 3600,
            prune_interval_secs: 60,
            event_capacity: 256,
        }
    }
}

impl TaskConfig {
    pub fn validated(self) -> Result<Self> {
        self.validate()?;
        Ok(self)
    }

    pub fn with_max_concurrent_tasks(mut self, max: usize) -> Self {
        self.max_concurrent_tasks = max;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout_secs = timeout.map(|d| d.as_secs());
        self
    }

    pub fn report_interval(&self) -> Duration {
        Duration::from_millis(self.report_interval_ms)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }

    pub fn prune_interval(&self) -> Duration {
        Duration::from_secs(self.prune_interval_secs)
    }
}
