//! Per-pair analysis results.
//!
//! One [`PairResult`] exists for every (persona, target) pair of a run: either
//! a completed [`AnalysisOutcome`] or a [`SkippedPair`] explaining why no
//! outcome was produced.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::finding::{Finding, Priority, Recommendation, Severity};
use super::persona::Persona;
use super::target::Target;

/// Score every outcome starts from before deductions.
pub const MAX_SCORE: f64 = 100.0;

/// Tolerance when comparing a reported score with the recomputed one.
const SCORE_EPSILON: f64 = 1e-9;

/// Points deducted from a target's score per finding severity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SeverityDeductions {
    #[serde(default = "default_critical_deduction")]
    pub critical: f64,
    #[serde(default = "default_high_deduction")]
    pub high: f64,
    #[serde(default = "default_medium_deduction")]
    pub medium: f64,
    #[serde(default = "default_low_deduction")]
    pub low: f64,
}

const fn default_critical_deduction() -> f64 {
    60.0
}

const fn default_high_deduction() -> f64 {
    40.0
}

const fn default_medium_deduction() -> f64 {
    15.0
}

const fn default_low_deduction() -> f64 {
    5.0
}

impl Default for SeverityDeductions {
    fn default() -> Self {
        Self {
            critical: default_critical_deduction(),
            high: default_high_deduction(),
            medium: default_medium_deduction(),
            low: default_low_deduction(),
        }
    }
}

impl SeverityDeductions {
    pub const fn for_severity(&self, severity: Severity) -> f64 {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
        }
    }

    /// Score left after deducting for every finding, clamped to [0, 100].
    pub fn score(&self, findings: &[Finding]) -> f64 {
        let deducted: f64 = findings.iter().map(|f| self.for_severity(f.severity)).sum();
        (MAX_SCORE - deducted).clamp(0.0, MAX_SCORE)
    }

    /// Deductions must be finite and non-negative so scores never increase.
    pub fn is_valid(&self) -> bool {
        Severity::ALL.iter().all(|s| {
            let value = self.for_severity(*s);
            value.is_finite() && value >= 0.0
        })
    }
}

/// Immutable input handed to an analyzer for exactly one invocation.
///
/// Contexts are built by the runner per pair and never shared between
/// concurrent invocations.
#[derive(Debug, Clone)]
pub struct AnalysisContext {
    persona: Arc<Persona>,
    target: Arc<Target>,
    deductions: SeverityDeductions,
}

impl AnalysisContext {
    pub const fn new(
        persona: Arc<Persona>,
        target: Arc<Target>,
        deductions: SeverityDeductions,
    ) -> Self {
        Self {
            persona,
            target,
            deductions,
        }
    }

    pub fn persona(&self) -> &Persona {
        &self.persona
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub const fn deductions(&self) -> &SeverityDeductions {
        &self.deductions
    }

    /// Start an outcome for this pair. The score is derived from the
    /// findings added to the builder.
    pub fn outcome(&self) -> OutcomeBuilder {
        OutcomeBuilder {
            persona_id: self.persona.id.clone(),
            target_id: self.target.id.clone(),
            deductions: self.deductions,
            findings: Vec::new(),
            recommendations: Vec::new(),
        }
    }
}

/// Accumulates findings and recommendations for one pair.
#[derive(Debug)]
pub struct OutcomeBuilder {
    persona_id: String,
    target_id: String,
    deductions: SeverityDeductions,
    findings: Vec<Finding>,
    recommendations: Vec<Recommendation>,
}

impl OutcomeBuilder {
    pub fn finding(self, severity: Severity, description: impl Into<String>) -> Self {
        self.push_finding(severity, description.into(), None)
    }

    pub fn finding_with_action(
        self,
        severity: Severity,
        description: impl Into<String>,
        suggested_action: impl Into<String>,
    ) -> Self {
        self.push_finding(severity, description.into(), Some(suggested_action.into()))
    }

    pub fn recommend(self, priority: Priority, description: impl Into<String>) -> Self {
        self.recommend_with(priority, description, None, None)
    }

    pub fn recommend_with(
        mut self,
        priority: Priority,
        description: impl Into<String>,
        expected_impact: Option<String>,
        implementation_hint: Option<String>,
    ) -> Self {
        self.recommendations.push(Recommendation {
            persona_id: self.persona_id.clone(),
            priority,
            description: description.into(),
            expected_impact,
            implementation_hint,
        });
        self
    }

    fn push_finding(
        mut self,
        severity: Severity,
        description: String,
        suggested_action: Option<String>,
    ) -> Self {
        self.findings.push(Finding {
            persona_id: self.persona_id.clone(),
            target_id: self.target_id.clone(),
            severity,
            description,
            suggested_action,
        });
        self
    }

    pub fn build(self) -> AnalysisOutcome {
        AnalysisOutcome {
            score: self.deductions.score(&self.findings),
            persona_id: self.persona_id,
            target_id: self.target_id,
            findings: self.findings,
            recommendations: self.recommendations,
        }
    }
}

/// The result of one persona analyzing one target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub persona_id: String,
    pub target_id: String,
    /// Score in [0, 100]
    pub score: f64,
    pub findings: Vec<Finding>,
    pub recommendations: Vec<Recommendation>,
}

impl AnalysisOutcome {
    /// Check the analyzer contract against the context it was invoked with.
    pub fn check_contract(&self, ctx: &AnalysisContext) -> Result<(), String> {
        if !(0.0..=MAX_SCORE).contains(&self.score) {
            return Err(format!("score {} outside [0, 100]", self.score));
        }
        if self.persona_id != ctx.persona().id {
            return Err(format!(
                "outcome persona '{}' does not match invoking persona '{}'",
                self.persona_id,
                ctx.persona().id
            ));
        }
        if self.target_id != ctx.target().id {
            return Err(format!(
                "outcome target '{}' does not match invoking target '{}'",
                self.target_id,
                ctx.target().id
            ));
        }
        for finding in &self.findings {
            if finding.persona_id != ctx.persona().id || finding.target_id != ctx.target().id {
                return Err(format!(
                    "finding attributed to '{}'/'{}' instead of '{}'/'{}'",
                    finding.persona_id,
                    finding.target_id,
                    ctx.persona().id,
                    ctx.target().id
                ));
            }
        }
        if let Some(rec) = self
            .recommendations
            .iter()
            .find(|r| r.persona_id != ctx.persona().id)
        {
            return Err(format!(
                "recommendation attributed to '{}' instead of '{}'",
                rec.persona_id,
                ctx.persona().id
            ));
        }

        let expected = ctx.deductions().score(&self.findings);
        if (self.score - expected).abs() > SCORE_EPSILON {
            return Err(format!(
                "score {} does not match {expected} derived from {} finding(s)",
                self.score,
                self.findings.len()
            ));
        }
        Ok(())
    }
}

/// Why a pair produced no outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    TargetUnavailable(String),
    AnalysisFailed(String),
    Cancelled,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TargetUnavailable(reason) => write!(f, "target unavailable: {reason}"),
            Self::AnalysisFailed(reason) => write!(f, "analysis failed: {reason}"),
            Self::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// A pair that was recorded without an outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedPair {
    pub persona_id: String,
    pub target_id: String,
    pub reason: SkipReason,
}

/// Exactly one of these exists per (persona, target) pair.
#[derive(Debug, Clone, PartialEq)]
pub enum PairResult {
    Completed(AnalysisOutcome),
    Skipped(SkippedPair),
}

impl PairResult {
    pub fn persona_id(&self) -> &str {
        match self {
            Self::Completed(o) => &o.persona_id,
            Self::Skipped(s) => &s.persona_id,
        }
    }

    pub fn target_id(&self) -> &str {
        match self {
            Self::Completed(o) => &o.target_id,
            Self::Skipped(s) => &s.target_id,
        }
    }

    pub const fn outcome(&self) -> Option<&AnalysisOutcome> {
        match self {
            Self::Completed(o) => Some(o),
            Self::Skipped(_) => None,
        }
    }

    pub const fn skipped(&self) -> Option<&SkippedPair> {
        match self {
            Self::Completed(_) => None,
            Self::Skipped(s) => Some(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> AnalysisContext {
        AnalysisContext::new(
            Arc::new(Persona::new("p1", "Persona One")),
            Arc::new(Target::new("t1", "t1", "content")),
            SeverityDeductions::default(),
        )
    }

    #[test]
    fn test_no_findings_scores_100() {
        let outcome = context().outcome().build();
        assert_eq!(outcome.score, 100.0);
        assert!(outcome.findings.is_empty());
    }

    #[test]
    fn test_single_high_finding_scores_60() {
        let outcome = context().outcome().finding(Severity::High, "exposed secret").build();
        assert_eq!(outcome.score, 60.0);
        assert_eq!(outcome.findings[0].persona_id, "p1");
        assert_eq!(outcome.findings[0].target_id, "t1");
    }

    #[test]
    fn test_score_floors_at_zero() {
        let outcome = context()
            .outcome()
            .finding(Severity::Critical, "a")
            .finding(Severity::Critical, "b")
            .build();
        assert_eq!(outcome.score, 0.0);
    }

    #[test]
    fn test_recommendations_do_not_affect_score() {
        let outcome = context()
            .outcome()
            .recommend(Priority::Critical, "rotate keys")
            .recommend_with(Priority::Low, "document", Some("clarity".into()), None)
            .build();
        assert_eq!(outcome.score, 100.0);
        assert_eq!(outcome.recommendations.len(), 2);
        assert_eq!(outcome.recommendations[1].expected_impact.as_deref(), Some("clarity"));
    }

    #[test]
    fn test_check_contract_rejects_out_of_range() {
        let ctx = context();
        let mut outcome = ctx.outcome().build();
        outcome.score = 101.0;
        assert!(outcome.check_contract(&ctx).is_err());

        outcome.score = 50.0;
        outcome.target_id = "other".into();
        assert!(outcome.check_contract(&ctx).unwrap_err().contains("target"));
    }

    #[test]
    fn test_check_contract_recomputes_score() {
        let ctx = context();
        let mut outcome = ctx.outcome().finding(Severity::Medium, "long function").build();
        assert!(outcome.check_contract(&ctx).is_ok());

        outcome.score = 100.0;
        let err = outcome.check_contract(&ctx).unwrap_err();
        assert!(err.contains("does not match 85"), "{err}");
    }

    #[test]
    fn test_check_contract_rejects_foreign_attribution() {
        let ctx = context();
        let mut outcome = ctx.outcome().finding(Severity::Low, "typo").build();
        outcome.findings[0].target_id = "t9".into();
        assert!(outcome.check_contract(&ctx).unwrap_err().contains("finding attributed"));

        let mut outcome = ctx.outcome().recommend(Priority::Low, "rename").build();
        outcome.recommendations[0].persona_id = "someone-else".into();
        assert!(outcome
            .check_contract(&ctx)
            .unwrap_err()
            .contains("recommendation attributed to 'someone-else'"));
    }

    #[test]
    fn test_negative_deduction_is_invalid() {
        let deductions = SeverityDeductions {
            low: -1.0,
            ..SeverityDeductions::default()
        };
        assert!(!deductions.is_valid());
        assert!(SeverityDeductions::default().is_valid());
    }

    #[test]
    fn test_skip_reason_serialization() {
        let json = serde_json::to_value(SkipReason::AnalysisFailed("boom".into())).unwrap();
        assert_eq!(json["kind"], "analysis_failed");
        assert_eq!(json["reason"], "boom");
        let cancelled = serde_json::to_value(SkipReason::Cancelled).unwrap();
        assert_eq!(cancelled["kind"], "cancelled");
    }
}
