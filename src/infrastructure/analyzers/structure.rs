use regex::Regex;

use crate::domain::errors::{AnalysisFailure, AssessmentError, AssessmentResult};
use crate::domain::models::{
    AnalysisContext, AnalysisOutcome, Priority, Severity, StructureLimits,
};
use crate::domain::ports::Analyzer;

const INDENT_WIDTH: usize = 4;

/// Measurements the structure analyzer compares against its limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StructureMetrics {
    pub lines: usize,
    pub long_lines: usize,
    pub markers: usize,
    pub max_nesting: usize,
}

/// Size and layout heuristics: file length, long lines, deferred-work
/// markers and indentation depth.
#[derive(Debug, Clone)]
pub struct StructureAnalyzer {
    limits: StructureLimits,
    marker: Regex,
}

impl StructureAnalyzer {
    pub fn compile(persona_id: &str, limits: &StructureLimits) -> AssessmentResult<Self> {
        let marker = Regex::new(&limits.marker_pattern).map_err(|e| {
            AssessmentError::InvalidPattern {
                persona_id: persona_id.to_string(),
                pattern: limits.marker_pattern.clone(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self {
            limits: limits.clone(),
            marker,
        })
    }

    pub fn measure(&self, content: &str) -> StructureMetrics {
        let mut metrics = StructureMetrics::default();
        for line in content.lines() {
            metrics.lines += 1;
            if line.chars().count() > self.limits.max_line_length {
                metrics.long_lines += 1;
            }
            metrics.markers += self.marker.find_iter(line).count();
            if !line.trim().is_empty() {
                metrics.max_nesting = metrics.max_nesting.max(indent_depth(line));
            }
        }
        metrics
    }
}

fn indent_depth(line: &str) -> usize {
    let mut columns = 0;
    for c in line.chars() {
        match c {
            ' ' => columns += 1,
            '\t' => columns += INDENT_WIDTH,
            _ => break,
        }
    }
    columns / INDENT_WIDTH
}

impl Analyzer for StructureAnalyzer {
    fn analyze(&self, ctx: &AnalysisContext) -> Result<AnalysisOutcome, AnalysisFailure> {
        let metrics = self.measure(&ctx.target().raw_content);
        let limits = &self.limits;
        let mut outcome = ctx.outcome();

        if metrics.lines > limits.max_lines {
            outcome = outcome
                .finding_with_action(
                    Severity::Medium,
                    format!("{} lines exceeds the limit of {}", metrics.lines, limits.max_lines),
                    "Split the file by responsibility",
                )
                .recommend_with(
                    Priority::Medium,
                    format!("Break up {}", ctx.target().display_name),
                    Some("Smaller units are easier to review and test".to_string()),
                    None,
                );
        }

        if metrics.long_lines > limits.long_line_allowance {
            outcome = outcome.finding(
                Severity::Low,
                format!(
                    "{} lines longer than {} characters",
                    metrics.long_lines, limits.max_line_length
                ),
            );
        }

        if metrics.markers > limits.max_markers {
            outcome = outcome
                .finding(
                    Severity::Low,
                    format!("{} deferred-work markers", metrics.markers),
                )
                .recommend(
                    Priority::Low,
                    format!("Triage the open markers in {}", ctx.target().display_name),
                );
        }

        if metrics.max_nesting > limits.max_nesting {
            outcome = outcome
                .finding_with_action(
                    Severity::Medium,
                    format!(
                        "Nesting depth {} exceeds the limit of {}",
                        metrics.max_nesting, limits.max_nesting
                    ),
                    "Extract nested blocks into functions or return early",
                )
                .recommend(
                    Priority::Medium,
                    format!("Flatten deeply nested code in {}", ctx.target().display_name),
                );
        }

        Ok(outcome.build())
    }

    fn kind(&self) -> &str {
        "structure"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Persona, SeverityDeductions, Target};
    use std::sync::Arc;

    fn ctx(content: &str) -> AnalysisContext {
        AnalysisContext::new(
            Arc::new(Persona::new("maintainability", "Maintainability")),
            Arc::new(Target::new("src/big.rs", "big.rs", content)),
            SeverityDeductions::default(),
        )
    }

    fn analyzer(limits: StructureLimits) -> StructureAnalyzer {
        StructureAnalyzer::compile("maintainability", &limits).unwrap()
    }

    #[test]
    fn test_measure() {
        let analyzer = analyzer(StructureLimits {
            max_line_length: 10,
            ..StructureLimits::default()
        });
        let content = "fn a() {\n    // TODO tidy\n\tif x {\n\t\t    deep();\n\t}\n}\nthis line is long\n";
        let metrics = analyzer.measure(content);
        assert_eq!(metrics.lines, 7);
        assert_eq!(metrics.long_lines, 3);
        assert_eq!(metrics.markers, 1);
        assert_eq!(metrics.max_nesting, 3);
    }

    #[test]
    fn test_small_file_is_clean() {
        let outcome = analyzer(StructureLimits::default())
            .analyze(&ctx("fn main() {}\n"))
            .unwrap();
        assert_eq!(outcome.score, 100.0);
    }

    #[test]
    fn test_limits_produce_findings() {
        let limits = StructureLimits {
            max_lines: 2,
            max_markers: 0,
            max_nesting: 1,
            ..StructureLimits::default()
        };
        let content = "a\n        b // FIXME\nc\n";
        let outcome = analyzer(limits).analyze(&ctx(content)).unwrap();

        let severities: Vec<_> = outcome.findings.iter().map(|f| f.severity).collect();
        assert_eq!(severities, vec![Severity::Medium, Severity::Low, Severity::Medium]);
        assert_eq!(outcome.score, 65.0);
        assert_eq!(outcome.recommendations.len(), 3);
    }

    #[test]
    fn test_bad_marker_pattern() {
        let limits = StructureLimits {
            marker_pattern: "(".to_string(),
            ..StructureLimits::default()
        };
        assert!(StructureAnalyzer::compile("maintainability", &limits).is_err());
    }
}
