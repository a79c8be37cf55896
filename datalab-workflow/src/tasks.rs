pub mod generation;
pub mod mining;
pub mod pipeline;
pub mod simulated;

pub use generation::*;
pub use mining::*;
pub use pipeline::*;
pub use simulated::*;

use datalab_core::{EdgeCase, Result, TaskConfig, TaskKind};
use std::sync::Arc;

use crate::work::Work;

/// Builds the work unit for a task kind, validating its parameters first so
/// bad requests are refused before anything is submitted.
#[derive(Debug, Clone)]
pub struct WorkFactory {
    progress: SimulatedProgress,
    edge_cases: Arc<Vec<EdgeCase>>,
}

impl WorkFactory {
    pub fn new(progress: SimulatedProgress, edge_cases: Vec<EdgeCase>) -> Self {
        Self {
            progress,
            edge_cases: Arc::new(edge_cases),
        }
    }

    pub fn from_config(config: &TaskConfig, edge_cases: Vec<EdgeCase>) -> Self {
        Self::new(SimulatedProgress::from_config(config), edge_cases)
    }

    pub fn build(&self, kind: TaskKind, params: &serde_json::Value) -> Result<Arc<dyn Work>> {
        let work: Arc<dyn Work> = match kind {
            TaskKind::Generation => {
                Arc::new(GenerationWork::from_params(params, self.progress.clone())?)
            }
            TaskKind::MiningAnalysis => Arc::new(MiningAnalysisWork::from_params(
                params,
                Arc::clone(&self.edge_cases),
                self.progress.clone(),
            )?),
            TaskKind::PipelineRun => {
                Arc::new(PipelineRunWork::from_params(params, self.progress.clone())?)
            }
        };
        Ok(work)
    }
}
