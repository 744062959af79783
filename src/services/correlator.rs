//! Cross-persona correlation.

use tracing::{debug, info};

use crate::domain::errors::{AssessmentError, AssessmentResult};
use crate::domain::models::{CorrelationFinding, CorrelationRule, PersonaSummary};
use crate::services::persona_registry::PersonaRegistry;

/// Evaluates correlation rules over persona summaries.
///
/// Rules are checked against the registry when the correlator is built, so a
/// typo in a persona id fails configuration instead of silently never
/// matching.
#[derive(Debug, Clone, Default)]
pub struct Correlator {
    rules: Vec<CorrelationRule>,
}

impl Correlator {
    pub fn new(rules: Vec<CorrelationRule>, registry: &PersonaRegistry) -> AssessmentResult<Self> {
        for (rule_index, rule) in rules.iter().enumerate() {
            for persona_id in [&rule.persona_a, &rule.persona_b] {
                if !registry.contains(persona_id) {
                    return Err(AssessmentError::UnknownPersonaReference {
                        rule_index,
                        persona_id: persona_id.clone(),
                    });
                }
            }
            if !rule.condition.is_valid() {
                return Err(AssessmentError::InvalidConfig(format!(
                    "correlation rule {rule_index} has a non-finite parameter"
                )));
            }
        }
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[CorrelationRule] {
        &self.rules
    }

    /// Findings for every rule whose condition holds, in rule order.
    ///
    /// A rule is skipped when either persona has no mean score.
    pub fn correlate(&self, summaries: &[PersonaSummary]) -> Vec<CorrelationFinding> {
        let score_of = |id: &str| {
            summaries
                .iter()
                .find(|s| s.persona_id == id)
                .and_then(|s| s.mean_score)
        };

        let findings: Vec<CorrelationFinding> = self
            .rules
            .iter()
            .enumerate()
            .filter_map(|(rule_index, rule)| {
                let (Some(score_a), Some(score_b)) =
                    (score_of(&rule.persona_a), score_of(&rule.persona_b))
                else {
                    debug!(rule_index, "Correlation rule skipped, persona unscored");
                    return None;
                };
                rule.condition
                    .evaluate(score_a, score_b)
                    .then(|| CorrelationFinding {
                        rule_index,
                        persona_a: rule.persona_a.clone(),
                        persona_b: rule.persona_b.clone(),
                        score_a,
                        score_b,
                        description: rule.description.clone(),
                    })
            })
            .collect();

        info!(
            rules = self.rules.len(),
            findings = findings.len(),
            "Correlation complete"
        );
        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::AnalysisFailure;
    use crate::domain::models::{AnalysisContext, AnalysisOutcome, Persona, ScoreCondition};

    fn registry() -> PersonaRegistry {
        let mut registry = PersonaRegistry::new();
        for id in ["p1", "p2"] {
            registry
                .register(
                    Persona::new(id, id),
                    |ctx: &AnalysisContext| -> Result<AnalysisOutcome, AnalysisFailure> {
                        Ok(ctx.outcome().build())
                    },
                )
                .unwrap();
        }
        registry
    }

    fn summary(id: &str, mean: Option<f64>) -> PersonaSummary {
        PersonaSummary {
            persona_id: id.into(),
            persona_name: id.into(),
            weight: None,
            mean_score: mean,
            risk_level: None,
            analyzed_count: 1,
            skipped_count: 0,
            skipped: vec![],
            findings: vec![],
            recommendations: vec![],
        }
    }

    fn gap_rule() -> CorrelationRule {
        CorrelationRule::new(
            "p1",
            "p2",
            ScoreCondition::ScoreGapAbove { threshold: 25.0 },
            "P1 and P2 diverge",
        )
    }

    #[test]
    fn test_gap_rule_not_triggered_when_close() {
        let correlator = Correlator::new(vec![gap_rule()], &registry()).unwrap();
        let findings = correlator.correlate(&[summary("p1", Some(80.0)), summary("p2", Some(90.0))]);
        assert!(findings.is_empty());
    }

    #[test]
    fn test_gap_rule_triggered_when_diverging() {
        let correlator = Correlator::new(vec![gap_rule()], &registry()).unwrap();
        let findings = correlator.correlate(&[summary("p1", Some(80.0)), summary("p2", Some(40.0))]);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].score_a, 80.0);
        assert_eq!(findings[0].score_b, 40.0);
        assert_eq!(findings[0].description, "P1 and P2 diverge");
    }

    #[test]
    fn test_unknown_persona_is_rejected_up_front() {
        let rule = CorrelationRule::new(
            "p1",
            "p3",
            ScoreCondition::BothBelow { threshold: 50.0 },
            "typo",
        );
        let err = Correlator::new(vec![gap_rule(), rule], &registry()).unwrap_err();
        assert!(matches!(
            err,
            AssessmentError::UnknownPersonaReference { rule_index: 1, ref persona_id } if persona_id == "p3"
        ));
    }

    #[test]
    fn test_unscored_persona_skips_rule() {
        let correlator = Correlator::new(vec![gap_rule()], &registry()).unwrap();
        let findings = correlator.correlate(&[summary("p1", Some(10.0)), summary("p2", None)]);
        assert!(findings.is_empty());
    }

    #[test]
    fn test_findings_follow_rule_order() {
        let rules = vec![
            CorrelationRule::new("p2", "p1", ScoreCondition::EitherBelow { threshold: 50.0 }, "second"),
            CorrelationRule::new("p1", "p2", ScoreCondition::custom("always", |_, _| true), "first"),
        ];
        let correlator = Correlator::new(rules, &registry()).unwrap();
        let findings = correlator.correlate(&[summary("p1", Some(30.0)), summary("p2", Some(90.0))]);
        let indices: Vec<_> = findings.iter().map(|f| f.rule_index).collect();
        assert_eq!(indices, vec![0, 1]);
        assert_eq!(findings[0].persona_a, "p2");
    }

    #[test]
    fn test_non_finite_parameter_rejected() {
        let rule = CorrelationRule::new(
            "p1",
            "p2",
            ScoreCondition::BothBelow { threshold: f64::INFINITY },
            "bad",
        );
        assert!(matches!(
            Correlator::new(vec![rule], &registry()),
            Err(AssessmentError::InvalidConfig(_))
        ));
    }
}
