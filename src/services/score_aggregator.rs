//! Score aggregation.
//!
//! Reduces pair results into one [`PersonaSummary`] per persona and persona
//! summaries into the overall score. Only completed outcomes count toward a
//! mean: a skipped pair is neither a 0 nor a 100, it is absent.

use tracing::debug;

use crate::domain::errors::{AssessmentError, AssessmentResult};
use crate::domain::models::{
    PairResult, Persona, PersonaSummary, RiskLevel, ScoreThresholds, Weighting,
};
use crate::services::assessment_runner::AssessmentRun;
use crate::services::persona_registry::PersonaRegistry;

/// Tolerance when checking that weights sum to 1.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Check persona weights for the chosen weighting mode.
///
/// Any declared weight must be finite and non-negative in both modes.
/// Weighted mode also requires every persona to carry a weight and the
/// weights to sum to 1.
pub fn validate_weights<'a>(
    personas: impl IntoIterator<Item = &'a Persona>,
    weighting: Weighting,
) -> AssessmentResult<()> {
    let personas: Vec<&Persona> = personas.into_iter().collect();

    // A declared weight must be usable even when uniform weighting ignores it.
    for persona in &personas {
        if let Some(weight) = persona.weight {
            if !weight.is_finite() || weight < 0.0 {
                return Err(AssessmentError::InvalidWeights(format!(
                    "persona '{}' has invalid weight {weight}",
                    persona.id
                )));
            }
        }
    }

    if weighting == Weighting::Uniform {
        return Ok(());
    }

    let mut sum = 0.0;
    for persona in personas {
        let weight = persona.weight.ok_or_else(|| {
            AssessmentError::InvalidWeights(format!(
                "persona '{}' has no weight but weighting is 'weighted'",
                persona.id
            ))
        })?;
        sum += weight;
    }

    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        return Err(AssessmentError::InvalidWeights(format!(
            "weights sum to {sum}, expected 1"
        )));
    }
    Ok(())
}

/// Reduces outcomes into summaries and summaries into an overall score.
#[derive(Debug, Clone, Copy)]
pub struct ScoreAggregator {
    thresholds: ScoreThresholds,
    weighting: Weighting,
}

impl ScoreAggregator {
    pub fn new(thresholds: ScoreThresholds, weighting: Weighting) -> AssessmentResult<Self> {
        thresholds
            .validate()
            .map_err(AssessmentError::InvalidThresholds)?;
        Ok(Self {
            thresholds,
            weighting,
        })
    }

    pub const fn weighting(&self) -> Weighting {
        self.weighting
    }

    pub fn risk_for(&self, score: f64) -> RiskLevel {
        self.thresholds.risk_for(score)
    }

    /// Summarize one persona's pair results.
    pub fn summarize<'a>(
        &self,
        persona: &Persona,
        results: impl IntoIterator<Item = &'a PairResult>,
    ) -> PersonaSummary {
        let mut summary = PersonaSummary {
            persona_id: persona.id.clone(),
            persona_name: persona.name.clone(),
            weight: persona.weight,
            mean_score: None,
            risk_level: None,
            analyzed_count: 0,
            skipped_count: 0,
            skipped: Vec::new(),
            findings: Vec::new(),
            recommendations: Vec::new(),
        };
        let mut total = 0.0;

        for result in results {
            match result {
                PairResult::Completed(outcome) => {
                    summary.analyzed_count += 1;
                    total += outcome.score;
                    summary.findings.extend(outcome.findings.iter().cloned());
                    summary
                        .recommendations
                        .extend(outcome.recommendations.iter().cloned());
                }
                PairResult::Skipped(skipped) => {
                    summary.skipped_count += 1;
                    summary.skipped.push(skipped.clone());
                }
            }
        }

        if summary.analyzed_count > 0 {
            #[allow(clippy::cast_precision_loss)]
            let mean = total / summary.analyzed_count as f64;
            summary.mean_score = Some(mean);
            summary.risk_level = Some(self.risk_for(mean));
        }

        debug!(
            persona_id = %summary.persona_id,
            mean_score = ?summary.mean_score,
            analyzed = summary.analyzed_count,
            skipped = summary.skipped_count,
            "Persona summarized"
        );
        summary
    }

    /// Summarize every registered persona, in registration order.
    pub fn summarize_all(
        &self,
        registry: &PersonaRegistry,
        run: &AssessmentRun,
    ) -> Vec<PersonaSummary> {
        registry
            .personas()
            .map(|persona| self.summarize(persona, run.results_for(&persona.id)))
            .collect()
    }

    /// Overall score across personas that have a mean score.
    ///
    /// Uniform mode is the plain mean of persona means. Weighted mode uses
    /// persona weights, renormalized over the personas that were scored.
    /// Returns `None` when no persona has a score.
    pub fn aggregate(&self, summaries: &[PersonaSummary]) -> Option<f64> {
        let scored: Vec<(f64, f64)> = summaries
            .iter()
            .filter_map(|s| {
                let weight = match self.weighting {
                    Weighting::Uniform => 1.0,
                    Weighting::Weighted => s.weight.unwrap_or(0.0),
                };
                s.mean_score.map(|score| (score, weight))
            })
            .collect();

        let weight_total: f64 = scored.iter().map(|(_, w)| w).sum();
        if scored.is_empty() || weight_total <= 0.0 {
            return None;
        }

        let weighted: f64 = scored.iter().map(|(score, w)| score * w).sum();
        Some((weighted / weight_total).clamp(0.0, 100.0))
    }
}
