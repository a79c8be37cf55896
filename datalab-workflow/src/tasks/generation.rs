use async_trait::async_trait;
use datalab_core::{CoreError, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use super::SimulatedProgress;
use crate::work::{Work, WorkContext};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum GenerationTemplate {
    CustomerService,
    CodeComments,
    TabularData,
    MedicalNotes,
}

impl GenerationTemplate {
    pub fn name(&self) -> &'static str {
        match self {
            GenerationTemplate::CustomerService => "Customer Service Dialogs",
            GenerationTemplate::CodeComments => "Code Documentation",
            GenerationTemplate::TabularData => "Tabular Records",
            GenerationTemplate::MedicalNotes => "Medical Case Studies",
        }
    }

    pub fn category(&self) -> &'static str {
        match self {
            GenerationTemplate::CustomerService => "Text",
            GenerationTemplate::CodeComments => "Code",
            GenerationTemplate::TabularData => "Structured",
            GenerationTemplate::MedicalNotes => "Healthcare",
        }
    }

    /// Knobs the template exposes to the prompt author.
    pub fn parameters(&self) -> &'static [&'static str] {
        match self {
            GenerationTemplate::CustomerService => &["tone", "complexity", "industry"],
            GenerationTemplate::CodeComments => &["language", "style", "detail_level"],
            GenerationTemplate::TabularData => &["columns", "data_types", "constraints"],
            GenerationTemplate::MedicalNotes => &["specialty", "complexity", "privacy_level"],
        }
    }
}

fn default_output_count() -> u64 {
    100
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct GenerationParams {
    pub template: GenerationTemplate,
    #[serde(default)]
    #[validate(length(max = 4000))]
    pub prompt: Option<String>,
    #[serde(default = "default_output_count")]
    #[validate(range(min = 1, max = 100000))]
    pub output_count: u64,
}

/// Synthetic data generation job.
pub struct GenerationWork {
    params: GenerationParams,
    progress: SimulatedProgress,
}

impl GenerationWork {
    pub fn new(params: GenerationParams, progress: SimulatedProgress) -> Self {
        Self { params, progress }
    }

    pub fn from_params(params: &serde_json::Value, progress: SimulatedProgress) -> Result<Self> {
        let params: GenerationParams = serde_json::from_value(params.clone())
            .map_err(|e| CoreError::Validation(format!("Invalid generation parameters: {}", e)))?;
        params.validate()?;
        Ok(Self::new(params, progress))
    }

    pub fn params(&self) -> &GenerationParams {
        &self.params
    }
}

#[async_trait]
impl Work for GenerationWork {
    async fn run(&self, ctx: WorkContext) -> Result<serde_json::Value> {
        let template = self.params.template;
        tracing::info!(
            task_id = %ctx.task_id,
            template = template.name(),
            count = self.params.output_count,
            "Generating synthetic records"
        );

        self.progress.run(&ctx).await?;

        Ok(json!({
            "template": template,
            "template_name": template.name(),
            "category": template.category(),
            "parameters": template.parameters(),
            "prompt": self.params.prompt,
            "requested": self.params.output_count,
            "generated": self.params.output_count,
        }))
    }

    fn name(&self) -> &str {
        "generation"
    }
}
