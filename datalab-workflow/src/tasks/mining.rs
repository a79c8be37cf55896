use async_trait::async_trait;
use datalab_core::{filter_by_severity, CoreError, EdgeCase, MiningStrategy, Result, Severity};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

use super::SimulatedProgress;
use crate::work::{Work, WorkContext};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct MiningParams {
    #[validate(length(min = 1, max = 255))]
    pub dataset: String,
    #[serde(default)]
    pub strategy: Option<MiningStrategy>,
    #[serde(default)]
    #[validate(length(max = 4000))]
    pub custom_prompt: Option<String>,
    /// `high`, `medium`, `low` or `all`.
    #[serde(default)]
    pub severity: Option<String>,
}

impl MiningParams {
    fn severity_filter(&self) -> Result<Option<Severity>> {
        match &self.severity {
            Some(selector) => Severity::parse_selector(selector),
            None => Ok(None),
        }
    }
}

/// Edge-case mining analysis over a dataset. Findings come from the
/// supplied catalog, narrowed by strategy and severity.
pub struct MiningAnalysisWork {
    params: MiningParams,
    severity: Option<Severity>,
    catalog: Arc<Vec<EdgeCase>>,
    progress: SimulatedProgress,
}

impl MiningAnalysisWork {
    pub fn from_params(
        params: &serde_json::Value,
        catalog: Arc<Vec<EdgeCase>>,
        progress: SimulatedProgress,
    ) -> Result<Self> {
        let params: MiningParams = serde_json::from_value(params.clone())
            .map_err(|e| CoreError::Validation(format!("Invalid mining parameters: {}", e)))?;
        params.validate()?;

        let has_prompt = params
            .custom_prompt
            .as_deref()
            .is_some_and(|prompt| !prompt.trim().is_empty());
        if params.strategy.is_none() && !has_prompt {
            return Err(CoreError::Validation(
                "Mining needs a strategy or a custom prompt".to_string(),
            ));
        }

        let severity = params.severity_filter()?;
        Ok(Self {
            params,
            severity,
            catalog,
            progress,
        })
    }

    fn findings(&self) -> Vec<EdgeCase> {
        let by_strategy: Vec<EdgeCase> = self
            .catalog
            .iter()
            .filter(|case| self.params.strategy.map_or(true, |s| case.strategy == s))
            .cloned()
            .collect();
        filter_by_severity(&by_strategy, self.severity)
    }
}

#[async_trait]
impl Work for MiningAnalysisWork {
    async fn run(&self, ctx: WorkContext) -> Result<serde_json::Value> {
        tracing::info!(
            task_id = %ctx.task_id,
            dataset = %self.params.dataset,
            strategy = ?self.params.strategy,
            "Mining edge cases"
        );

        self.progress.run(&ctx).await?;

        let findings = self.findings();
        Ok(json!({
            "dataset": self.params.dataset,
            "strategy": self.params.strategy,
            "custom_prompt": self.params.custom_prompt,
            "severity": self.severity,
            "cases_found": findings.len(),
            "edge_cases": findings,
        }))
    }

    fn name(&self) -> &str {
        "mining-analysis"
    }
}
