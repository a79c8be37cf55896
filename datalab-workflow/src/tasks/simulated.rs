use datalab_core::{CoreError, Result, TaskConfig, COMPLETE_PROGRESS};
use rand::Rng;
use std::time::Duration;

use crate::work::WorkContext;

/// Timer-driven progress: every `interval` the value grows by a uniform
/// random step in `(0, max_step]` until it reaches the target.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedProgress {
    interval: Duration,
    max_step: f64,
}

impl SimulatedProgress {
    pub fn new(interval: Duration, max_step: f64) -> Self {
        Self { interval, max_step }
    }

    pub fn from_config(config: &TaskConfig) -> Self {
        Self::new(config.report_interval(), config.max_progress_step)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn max_step(&self) -> f64 {
        self.max_step
    }

    /// Runs from 0 to 100.
    pub async fn run(&self, ctx: &WorkContext) -> Result<()> {
        self.advance(ctx, 0.0, COMPLETE_PROGRESS).await
    }

    /// Reports increasing values from `from` until `to` is reported, one
    /// step per tick. Fails as soon as the work is cancelled.
    pub async fn advance(&self, ctx: &WorkContext, from: f64, to: f64) -> Result<()> {
        if !(self.max_step > 0.0) {
            return Err(CoreError::Validation(format!(
                "Progress step must be positive, got {}",
                self.max_step
            )));
        }

        let mut progress = from;
        while progress < to {
            tokio::select! {
                _ = ctx.cancel.cancelled() => {
                    return Err(CoreError::Internal(format!("Task {} was stopped", ctx.task_id)));
                }
                _ = tokio::time::sleep(self.interval) => {}
            }

            progress = (progress + self.next_step()).min(to);
            ctx.progress.report(progress);
        }
        Ok(())
    }

    fn next_step(&self) -> f64 {
        let low = f64::EPSILON.min(self.max_step);
        rand::thread_rng().gen_range(low..=self.max_step)
    }
}

impl Default for SimulatedProgress {
    fn default() -> Self {
        Self::from_config(&TaskConfig::default())
    }
}
