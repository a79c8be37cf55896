use async_trait::async_trait;
use datalab_core::{CoreError, Result, COMPLETE_PROGRESS};
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use super::SimulatedProgress;
use crate::work::{Work, WorkContext};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct PipelineParams {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(min = 1, max = 32))]
    pub stages: Vec<String>,
}

/// Runs pipeline stages in order; each stage owns an equal share of the
/// progress bar.
pub struct PipelineRunWork {
    params: PipelineParams,
    progress: SimulatedProgress,
}

impl PipelineRunWork {
    pub fn from_params(params: &serde_json::Value, progress: SimulatedProgress) -> Result<Self> {
        let params: PipelineParams = serde_json::from_value(params.clone())
            .map_err(|e| CoreError::Validation(format!("Invalid pipeline parameters: {}", e)))?;
        params.validate()?;
        if params.stages.iter().any(|stage| stage.trim().is_empty()) {
            return Err(CoreError::Validation("Pipeline stage names cannot be empty".to_string()));
        }
        Ok(Self { params, progress })
    }
}

#[async_trait]
impl Work for PipelineRunWork {
    async fn run(&self, ctx: WorkContext) -> Result<serde_json::Value> {
        let share = COMPLETE_PROGRESS / self.params.stages.len() as f64;
        let mut completed = Vec::with_capacity(self.params.stages.len());

        for (index, stage) in self.params.stages.iter().enumerate() {
            tracing::info!(
                task_id = %ctx.task_id,
                pipeline = %self.params.name,
                stage = %stage,
                "Running pipeline stage"
            );
            let from = share * index as f64;
            let to = if index + 1 == self.params.stages.len() {
                COMPLETE_PROGRESS
            } else {
                share * (index + 1) as f64
            };
            self.progress.advance(&ctx, from, to).await?;
            completed.push(stage.clone());
        }

        Ok(json!({
            "pipeline": self.params.name,
            "stages_completed": completed,
        }))
    }

    fn name(&self) -> &str {
        "pipeline-run"
    }
}
