//! Report rendering.
//!
//! Turns an [`AggregateAssessment`] into the two run artifacts: the
//! structured JSON document and a markdown digest short enough for chat
//! delivery. Rendering does no I/O.

use std::fmt::Write as _;

use crate::domain::errors::AssessmentResult;
use crate::domain::models::{AggregateAssessment, ReportConfig};

/// Appended when the summary is cut to fit `max_summary_chars`.
pub const TRUNCATION_MARKER: &str = "\n… (summary truncated)";

/// Both artifacts of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReport {
    /// Pretty JSON serialization of the full assessment
    pub document: String,
    /// Bounded markdown digest
    pub summary: String,
}

/// Renders assessments.
#[derive(Debug, Clone, Copy)]
pub struct ReportSynthesizer {
    recommendations_per_phase: usize,
    correlation_findings: usize,
    max_summary_chars: usize,
}

impl Default for ReportSynthesizer {
    fn default() -> Self {
        Self::new(&ReportConfig::default())
    }
}

impl ReportSynthesizer {
    pub const fn new(config: &ReportConfig) -> Self {
        Self {
            recommendations_per_phase: config.summary_recommendations_per_phase,
            correlation_findings: config.summary_correlation_findings,
            max_summary_chars: config.max_summary_chars,
        }
    }

    pub fn render(&self, assessment: &AggregateAssessment) -> AssessmentResult<RenderedReport> {
        let document = serde_json::to_string_pretty(assessment)?;
        let summary = bound(self.summarize(assessment), self.max_summary_chars);
        Ok(RenderedReport { document, summary })
    }

    fn summarize(&self, assessment: &AggregateAssessment) -> String {
        let mut out = String::new();

        out.push_str("# Conclave assessment\n\n");
        match (assessment.overall_score, assessment.risk_level) {
            (Some(score), Some(risk)) => {
                let _ = writeln!(out, "**Overall score:** {score:.1} ({risk} risk)");
            }
            (Some(score), None) => {
                let _ = writeln!(out, "**Overall score:** {score:.1}");
            }
            _ => out.push_str("**Overall score:** n/a (no persona produced a score)\n"),
        }
        let _ = writeln!(
            out,
            "Targets: {} | Findings: {} | Weighting: {}",
            assessment.target_count,
            assessment.total_findings(),
            assessment.weighting.as_str()
        );
        if assessment.partial {
            out.push_str("_Partial run: cancelled before every pair was analyzed._\n");
        }

        out.push_str("\n## Personas\n");
        for summary in &assessment.persona_summaries {
            let score = summary
                .mean_score
                .map_or_else(|| "n/a".to_string(), |s| format!("{s:.1}"));
            let risk = summary
                .risk_level
                .map_or_else(String::new, |r| format!(" ({r})"));
            let _ = writeln!(
                out,
                "- {}: {score}{risk}, {} analyzed, {} skipped",
                summary.persona_name, summary.analyzed_count, summary.skipped_count
            );
        }

        if !assessment.correlation_findings.is_empty() {
            out.push_str("\n## Correlations\n");
            for finding in assessment
                .correlation_findings
                .iter()
                .take(self.correlation_findings)
            {
                let _ = writeln!(
                    out,
                    "- {} ({} {:.1} / {} {:.1})",
                    finding.description,
                    finding.persona_a,
                    finding.score_a,
                    finding.persona_b,
                    finding.score_b
                );
            }
            let hidden = assessment
                .correlation_findings
                .len()
                .saturating_sub(self.correlation_findings);
            if hidden > 0 {
                let _ = writeln!(out, "- … and {hidden} more");
            }
        }

        out.push_str("\n## Recommendations\n");
        for phase in &assessment.prioritized_phases {
            if phase.total_count == 0 {
                continue;
            }
            let _ = writeln!(out, "### {} ({})", phase.phase, phase.total_count);
            for rec in phase.recommendations.iter().take(self.recommendations_per_phase) {
                let _ = writeln!(out, "- [{}] {}", rec.persona_id, rec.description);
            }
            let hidden = phase.total_count.saturating_sub(
                phase.recommendations.len().min(self.recommendations_per_phase),
            );
            if hidden > 0 {
                let _ = writeln!(out, "- … and {hidden} more");
            }
        }
        if assessment.prioritized_phases.iter().all(|p| p.total_count == 0) {
            out.push_str("None.\n");
        }

        out
    }
}

/// Cut `text` to at most `max_chars` characters, marker included.
fn bound(text: String, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text;
    }
    let marker_chars = TRUNCATION_MARKER.chars().count();
    if max_chars <= marker_chars {
        return text.chars().take(max_chars).collect();
    }
    let mut cut: String = text.chars().take(max_chars - marker_chars).collect();
    cut.push_str(TRUNCATION_MARKER);
    cut
}
