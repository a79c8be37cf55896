use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::record::{Record, RecordKind};
use crate::error::{CoreError, Result};

// ===== Mining Strategy =====

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum MiningStrategy {
    BiasDetection,
    FailureModes,
    AdversarialExamples,
    OutlierDetection,
}

impl MiningStrategy {
    pub const ALL: [MiningStrategy; 4] = [
        MiningStrategy::BiasDetection,
        MiningStrategy::FailureModes,
        MiningStrategy::AdversarialExamples,
        MiningStrategy::OutlierDetection,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MiningStrategy::BiasDetection => "bias-detection",
            MiningStrategy::FailureModes => "failure-modes",
            MiningStrategy::AdversarialExamples => "adversarial-examples",
            MiningStrategy::OutlierDetection => "outlier-detection",
        }
    }
}

impl fmt::Display for MiningStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MiningStrategy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        MiningStrategy::ALL
            .into_iter()
            .find(|strategy| strategy.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CoreError::Validation(format!("Unknown mining strategy: {}", s)))
    }
}

// ===== Severity =====

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }

    /// Parses a severity selector where `all` means no restriction.
    pub fn parse_selector(s: &str) -> Result<Option<Self>> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(None);
        }
        s.parse().map(Some)
    }
}

impl FromStr for Severity {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            other => Err(CoreError::Validation(format!("Unknown severity: {}", other))),
        }
    }
}

// ===== Edge Case =====

/// An unusual, failure-prone or biased example found by a mining run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EdgeCase {
    pub id: String,
    pub strategy: MiningStrategy,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    pub example: String,
    pub confidence: f64,
    pub category: String,
    pub dataset: String,
    pub impact: String,
}

impl EdgeCase {
    pub fn to_record(&self) -> Record {
        Record::new(
            self.id.as_str(),
            RecordKind::EdgeCase,
            self.title.as_str(),
            self.description.as_str(),
        )
        .with_tags([self.category.to_lowercase(), self.strategy.as_str().to_string()])
        .with_metadata("severity", self.severity.as_str())
        .with_metadata("strategy", self.strategy.as_str())
        .with_metadata("confidence", self.confidence)
        .with_metadata("dataset", self.dataset.as_str())
    }
}

/// Keeps cases with the given severity; `None` keeps everything.
pub fn filter_by_severity(cases: &[EdgeCase], severity: Option<Severity>) -> Vec<EdgeCase> {
    cases
        .iter()
        .filter(|case| severity.map_or(true, |wanted| case.severity == wanted))
        .cloned()
        .collect()
}
