//! Aggregated assessment models.
//!
//! Everything here is derived from pair results: summaries are reductions of
//! outcomes, the aggregate is a reduction of summaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::finding::{Finding, Priority, Recommendation};
use super::outcome::SkippedPair;

/// Risk band derived from a score via [`ScoreThresholds`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Minimum scores for each risk band; anything below `high` is critical.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ScoreThresholds {
    #[serde(default = "default_low_threshold")]
    pub low: f64,
    #[serde(default = "default_medium_threshold")]
    pub medium: f64,
    #[serde(default = "default_high_threshold")]
    pub high: f64,
}

const fn default_low_threshold() -> f64 {
    90.0
}

const fn default_medium_threshold() -> f64 {
    70.0
}

const fn default_high_threshold() -> f64 {
    50.0
}

impl Default for ScoreThresholds {
    fn default() -> Self {
        Self {
            low: default_low_threshold(),
            medium: default_medium_threshold(),
            high: default_high_threshold(),
        }
    }
}

impl ScoreThresholds {
    pub fn risk_for(&self, score: f64) -> RiskLevel {
        if score >= self.low {
            RiskLevel::Low
        } else if score >= self.medium {
            RiskLevel::Medium
        } else if score >= self.high {
            RiskLevel::High
        } else {
            RiskLevel::Critical
        }
    }

    /// Thresholds must lie in [0, 100] and descend from `low` to `high`.
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [("low", self.low), ("medium", self.medium), ("high", self.high)] {
            if !value.is_finite() || !(0.0..=100.0).contains(&value) {
                return Err(format!("{name} threshold {value} must be within [0, 100]"));
            }
        }
        if self.low < self.medium || self.medium < self.high {
            return Err(format!(
                "thresholds must satisfy low >= medium >= high (got {} / {} / {})",
                self.low, self.medium, self.high
            ));
        }
        Ok(())
    }
}

/// How persona mean scores are combined into the overall score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weighting {
    #[default]
    Uniform,
    Weighted,
}

impl Weighting {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Uniform => "uniform",
            Self::Weighted => "weighted",
        }
    }
}

/// Per-phase display caps. `None` keeps every recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PhaseCaps {
    #[serde(default)]
    pub critical: Option<usize>,
    #[serde(default)]
    pub high: Option<usize>,
    #[serde(default)]
    pub medium: Option<usize>,
    #[serde(default)]
    pub low: Option<usize>,
}

impl PhaseCaps {
    pub const fn cap_for(&self, priority: Priority) -> Option<usize> {
        match priority {
            Priority::Critical => self.critical,
            Priority::High => self.high,
            Priority::Medium => self.medium,
            Priority::Low => self.low,
        }
    }

    /// Same cap for every phase.
    pub const fn uniform(cap: usize) -> Self {
        Self {
            critical: Some(cap),
            high: Some(cap),
            medium: Some(cap),
            low: Some(cap),
        }
    }
}

/// Reduction of all of one persona's pair results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaSummary {
    pub persona_id: String,
    pub persona_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Mean over successful outcomes; `None` when every pair was skipped
    pub mean_score: Option<f64>,
    pub risk_level: Option<RiskLevel>,
    pub analyzed_count: usize,
    pub skipped_count: usize,
    pub skipped: Vec<SkippedPair>,
    pub findings: Vec<Finding>,
    pub recommendations: Vec<Recommendation>,
}

impl PersonaSummary {
    pub fn total_pairs(&self) -> usize {
        self.analyzed_count + self.skipped_count
    }
}

/// A cross-cutting concern surfaced by a correlation rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationFinding {
    pub rule_index: usize,
    pub persona_a: String,
    pub persona_b: String,
    pub score_a: f64,
    pub score_b: f64,
    pub description: String,
}

/// One remediation phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrioritizedPhase {
    pub phase: Priority,
    pub recommendations: Vec<Recommendation>,
    /// Recommendations at this priority before the cap was applied
    pub total_count: usize,
    pub truncated_count: usize,
}

/// Terminal artifact of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateAssessment {
    pub run_id: Uuid,
    pub overall_score: Option<f64>,
    pub risk_level: Option<RiskLevel>,
    pub weighting: Weighting,
    pub target_count: usize,
    pub persona_summaries: Vec<PersonaSummary>,
    pub correlation_findings: Vec<CorrelationFinding>,
    pub prioritized_phases: Vec<PrioritizedPhase>,
    pub generated_at: DateTime<Utc>,
    /// True when the run was cancelled before every pair was dispatched
    pub partial: bool,
}

impl AggregateAssessment {
    pub fn summary_for(&self, persona_id: &str) -> Option<&PersonaSummary> {
        self.persona_summaries
            .iter()
            .find(|s| s.persona_id == persona_id)
    }

    pub fn phase(&self, priority: Priority) -> Option<&PrioritizedPhase> {
        self.prioritized_phases.iter().find(|p| p.phase == priority)
    }

    pub fn total_findings(&self) -> usize {
        self.persona_summaries.iter().map(|s| s.findings.len()).sum()
    }
}

/// Stages of a pipeline run, in the only order they may be entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Initialized,
    Cataloging,
    Analyzing,
    Aggregating,
    Correlating,
    Prioritizing,
    Reporting,
    Notifying,
    Done,
}

impl PipelineStage {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Initialized => "initialized",
            Self::Cataloging => "cataloging",
            Self::Analyzing => "analyzing",
            Self::Aggregating => "aggregating",
            Self::Correlating => "correlating",
            Self::Prioritizing => "prioritizing",
            Self::Reporting => "reporting",
            Self::Notifying => "notifying",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
