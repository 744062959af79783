//! Correlation rules over pairs of persona scores.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Predicate signature for programmatic conditions: `(score_a, score_b)`.
pub type ScorePredicate = dyn Fn(f64, f64) -> bool + Send + Sync;

/// A programmatic condition. Not expressible in configuration files.
#[derive(Clone)]
pub struct CustomCondition {
    pub label: String,
    predicate: Arc<ScorePredicate>,
}

impl CustomCondition {
    pub fn new<F>(label: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(f64, f64) -> bool + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            predicate: Arc::new(predicate),
        }
    }
}

impl fmt::Debug for CustomCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomCondition")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Condition evaluated over the mean scores of the two referenced personas.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoreCondition {
    /// `|score_a - score_b| > threshold`
    ScoreGapAbove { threshold: f64 },
    /// Both scores strictly below `threshold`
    BothBelow { threshold: f64 },
    /// At least one score strictly below `threshold`
    EitherBelow { threshold: f64 },
    /// `score_a` trails `score_b` by more than `margin`
    ABelowB { margin: f64 },
    #[serde(skip)]
    Custom(CustomCondition),
}

impl ScoreCondition {
    pub fn evaluate(&self, score_a: f64, score_b: f64) -> bool {
        match self {
            Self::ScoreGapAbove { threshold } => (score_a - score_b).abs() > *threshold,
            Self::BothBelow { threshold } => score_a < *threshold && score_b < *threshold,
            Self::EitherBelow { threshold } => score_a < *threshold || score_b < *threshold,
            Self::ABelowB { margin } => score_b - score_a > *margin,
            Self::Custom(custom) => (custom.predicate)(score_a, score_b),
        }
    }

    pub fn custom<F>(label: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(f64, f64) -> bool + Send + Sync + 'static,
    {
        Self::Custom(CustomCondition::new(label, predicate))
    }

    fn parameter(&self) -> Option<f64> {
        match self {
            Self::ScoreGapAbove { threshold }
            | Self::BothBelow { threshold }
            | Self::EitherBelow { threshold } => Some(*threshold),
            Self::ABelowB { margin } => Some(*margin),
            Self::Custom(_) => None,
        }
    }

    /// Declarative parameters must be finite.
    pub fn is_valid(&self) -> bool {
        self.parameter().is_none_or(f64::is_finite)
    }
}

/// Relates two personas' summary scores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationRule {
    pub persona_a: String,
    pub persona_b: String,
    pub condition: ScoreCondition,
    pub description: String,
}

impl CorrelationRule {
    pub fn new(
        persona_a: impl Into<String>,
        persona_b: impl Into<String>,
        condition: ScoreCondition,
        description: impl Into<String>,
    ) -> Self {
        Self {
            persona_a: persona_a.into(),
            persona_b: persona_b.into(),
            condition,
            description: description.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_gap() {
        let condition = ScoreCondition::ScoreGapAbove { threshold: 25.0 };
        assert!(!condition.evaluate(80.0, 90.0));
        assert!(condition.evaluate(80.0, 40.0));
        assert!(condition.evaluate(40.0, 80.0));
        assert!(!condition.evaluate(50.0, 75.0));
    }

    #[test]
    fn test_threshold_conditions() {
        let both = ScoreCondition::BothBelow { threshold: 60.0 };
        assert!(both.evaluate(59.0, 10.0));
        assert!(!both.evaluate(59.0, 60.0));

        let either = ScoreCondition::EitherBelow { threshold: 60.0 };
        assert!(either.evaluate(59.0, 100.0));
        assert!(!either.evaluate(60.0, 60.0));

        let trails = ScoreCondition::ABelowB { margin: 10.0 };
        assert!(trails.evaluate(50.0, 70.0));
        assert!(!trails.evaluate(70.0, 50.0));
    }

    #[test]
    fn test_custom_condition() {
        let condition = ScoreCondition::custom("sum below 100", |a, b| a + b < 100.0);
        assert!(condition.evaluate(40.0, 40.0));
        assert!(!condition.evaluate(60.0, 60.0));
        assert!(condition.is_valid());
        assert!(format!("{condition:?}").contains("sum below 100"));
    }

    #[test]
    fn test_yaml_rule() {
        let yaml = r"
persona_a: security
persona_b: reliability
condition:
  kind: score_gap_above
  threshold: 25
description: Security and reliability disagree
";
        let rule: CorrelationRule = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(rule.persona_a, "security");
        assert!(rule.condition.evaluate(90.0, 50.0));
    }

    #[test]
    fn test_non_finite_parameter_is_invalid() {
        assert!(!ScoreCondition::BothBelow { threshold: f64::NAN }.is_valid());
    }
}
