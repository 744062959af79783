use regex::Regex;

use crate::domain::errors::{AnalysisFailure, AssessmentError, AssessmentResult};
use crate::domain::models::{
    AnalysisContext, AnalysisOutcome, PatternRule, RecommendationTemplate, Severity,
};
use crate::domain::ports::Analyzer;

#[derive(Debug, Clone)]
struct CompiledRule {
    regex: Regex,
    severity: Severity,
    description: String,
    suggested_action: Option<String>,
    recommendation: Option<RecommendationTemplate>,
    extensions: Vec<String>,
}

impl CompiledRule {
    fn applies_to(&self, extension: Option<&str>) -> bool {
        self.extensions.is_empty()
            || extension.is_some_and(|ext| self.extensions.iter().any(|e| e == ext))
    }
}

/// Ordered regex heuristics. Each matching rule contributes one finding per
/// target, however many times it matches.
#[derive(Debug, Clone)]
pub struct PatternAnalyzer {
    rules: Vec<CompiledRule>,
}

impl PatternAnalyzer {
    /// Compile `rules` for `persona_id`. Fails with `InvalidPattern` on the
    /// first pattern that does not compile.
    pub fn compile(persona_id: &str, rules: &[PatternRule]) -> AssessmentResult<Self> {
        let rules = rules
            .iter()
            .map(|rule| {
                let regex = Regex::new(&rule.pattern).map_err(|e| AssessmentError::InvalidPattern {
                    persona_id: persona_id.to_string(),
                    pattern: rule.pattern.clone(),
                    reason: e.to_string(),
                })?;
                Ok(CompiledRule {
                    regex,
                    severity: rule.severity,
                    description: rule.description.clone(),
                    suggested_action: rule.suggested_action.clone(),
                    recommendation: rule.recommendation.clone(),
                    extensions: rule
                        .extensions
                        .iter()
                        .map(|e| e.trim_start_matches('.').to_lowercase())
                        .collect(),
                })
            })
            .collect::<AssessmentResult<Vec<_>>>()?;

        Ok(Self { rules })
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

impl Analyzer for PatternAnalyzer {
    fn analyze(&self, ctx: &AnalysisContext) -> Result<AnalysisOutcome, AnalysisFailure> {
        let target = ctx.target();
        let extension = target.extension();
        let mut outcome = ctx.outcome();

        for rule in self
            .rules
            .iter()
            .filter(|r| r.applies_to(extension.as_deref()))
        {
            let matches = rule.regex.find_iter(&target.raw_content).count();
            if matches == 0 {
                continue;
            }

            let description = if matches == 1 {
                format!("{} (1 occurrence)", rule.description)
            } else {
                format!("{} ({matches} occurrences)", rule.description)
            };
            outcome = match &rule.suggested_action {
                Some(action) => outcome.finding_with_action(rule.severity, description, action),
                None => outcome.finding(rule.severity, description),
            };

            if let Some(rec) = &rule.recommendation {
                outcome = outcome.recommend_with(
                    rec.priority,
                    rec.description.clone(),
                    rec.expected_impact.clone(),
                    rec.implementation_hint.clone(),
                );
            }
        }

        Ok(outcome.build())
    }

    fn kind(&self) -> &str {
        "patterns"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Persona, Priority, SeverityDeductions, Target};
    use std::sync::Arc;

    fn ctx(id: &str, content: &str) -> AnalysisContext {
        AnalysisContext::new(
            Arc::new(Persona::new("security", "Security")),
            Arc::new(Target::new(id, id, content)),
            SeverityDeductions::default(),
        )
    }

    fn rule(pattern: &str, severity: Severity) -> PatternRule {
        PatternRule {
            pattern: pattern.to_string(),
            severity,
            description: format!("matched {pattern}"),
            suggested_action: None,
            recommendation: None,
            extensions: vec![],
        }
    }

    #[test]
    fn test_clean_target_scores_full() {
        let analyzer = PatternAnalyzer::compile("security", &[rule("eval\\(", Severity::High)]).unwrap();
        let outcome = analyzer.analyze(&ctx("a.py", "print('hi')")).unwrap();
        assert_eq!(outcome.score, 100.0);
        assert!(outcome.findings.is_empty());
    }

    #[test]
    fn test_one_finding_per_rule_with_count() {
        let analyzer = PatternAnalyzer::compile("security", &[rule("eval\\(", Severity::High)]).unwrap();
        let outcome = analyzer
            .analyze(&ctx("a.py", "eval(a)\neval(b)\neval(c)"))
            .unwrap();
        assert_eq!(outcome.findings.len(), 1);
        assert!(outcome.findings[0].description.contains("3 occurrences"));
        assert_eq!(outcome.score, 60.0);
    }

    #[test]
    fn test_recommendation_and_action_are_emitted() {
        let mut with_rec = rule("password\\s*=", Severity::Critical);
        with_rec.suggested_action = Some("Move it to a secret store".to_string());
        with_rec.recommendation = Some(RecommendationTemplate {
            priority: Priority::Critical,
            description: "Rotate the credential".to_string(),
            expected_impact: Some("No leaked secrets".to_string()),
            implementation_hint: None,
        });
        let analyzer = PatternAnalyzer::compile("security", &[with_rec]).unwrap();

        let outcome = analyzer.analyze(&ctx("cfg.py", "password = 'x'")).unwrap();
        assert_eq!(outcome.score, 40.0);
        assert_eq!(
            outcome.findings[0].suggested_action.as_deref(),
            Some("Move it to a secret store")
        );
        assert_eq!(outcome.recommendations.len(), 1);
        assert_eq!(outcome.recommendations[0].priority, Priority::Critical);
        assert_eq!(outcome.recommendations[0].persona_id, "security");
    }

    #[test]
    fn test_extension_filter() {
        let mut rust_only = rule("unsafe\\s*\\{", Severity::Medium);
        rust_only.extensions = vec![".RS".to_string()];
        let analyzer = PatternAnalyzer::compile("security", &[rust_only]).unwrap();

        assert_eq!(analyzer.analyze(&ctx("a.rs", "unsafe { }")).unwrap().findings.len(), 1);
        assert!(analyzer.analyze(&ctx("a.py", "unsafe { }")).unwrap().findings.is_empty());
        assert!(analyzer.analyze(&ctx("Makefile", "unsafe { }")).unwrap().findings.is_empty());
    }

    #[test]
    fn test_invalid_pattern() {
        let err = PatternAnalyzer::compile("security", &[rule("([", Severity::Low)]).unwrap_err();
        assert!(matches!(
            err,
            AssessmentError::InvalidPattern { ref persona_id, .. } if persona_id == "security"
        ));
    }
}
