use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use super::ids::RecordId;
use crate::error::{CoreError, Result};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Dataset,
    Pipeline,
    Document,
    EdgeCase,
    QualityMetric,
    QualityIssue,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Dataset => "dataset",
            RecordKind::Pipeline => "pipeline",
            RecordKind::Document => "document",
            RecordKind::EdgeCase => "edge_case",
            RecordKind::QualityMetric => "quality_metric",
            RecordKind::QualityIssue => "quality_issue",
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dataset" | "datasets" => Ok(RecordKind::Dataset),
            "pipeline" | "pipelines" => Ok(RecordKind::Pipeline),
            "document" | "documents" | "documentation" => Ok(RecordKind::Document),
            "edge_case" | "edge-case" | "edge_cases" => Ok(RecordKind::EdgeCase),
            "quality_metric" | "quality-metric" | "quality_metrics" => Ok(RecordKind::QualityMetric),
            "quality_issue" | "quality-issue" | "quality_issues" => Ok(RecordKind::QualityIssue),
            other => Err(CoreError::Validation(format!("Unknown record kind: {}", other))),
        }
    }
}

/// A searchable item: dataset, pipeline, document, mined edge case, or a
/// data quality metric or issue.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Record {
    pub id: RecordId,
    pub kind: RecordKind,
    pub name: String,
    pub description: String,
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl Record {
    pub fn new(
        id: impl Into<RecordId>,
        kind: RecordKind,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            name: name.into(),
            description: description.into(),
            tags: BTreeSet::new(),
            metadata: serde_json::Map::new(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Metadata value rendered as text, for facet comparisons.
    pub fn metadata_text(&self, key: &str) -> Option<String> {
        match self.metadata.get(key)? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}
