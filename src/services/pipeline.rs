//! End-to-end assessment pipeline.
//!
//! [`AssessmentPipeline`] wires the catalog, runner, aggregator, correlator,
//! prioritizer, synthesizer and notifier together. Every configuration check
//! happens in [`PipelineBuilder::build`], so a pipeline that exists is one
//! that can run: `run` only fails on an empty or unlistable catalog, a
//! report that cannot be written, or a serialization error.

use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::errors::{AssessmentError, AssessmentResult};
use crate::domain::models::{
    AggregateAssessment, Config, CorrelationRule, PipelineStage, ReportConfig,
};
use crate::domain::ports::{NotificationOutcome, Notifier, TargetSource};
use crate::infrastructure::notifiers::build_notifier;
use crate::services::assessment_runner::{AssessmentRunner, RunnerSettings};
use crate::services::correlator::Correlator;
use crate::services::persona_registry::PersonaRegistry;
use crate::services::prioritizer::RecommendationPrioritizer;
use crate::services::report_synthesizer::{RenderedReport, ReportSynthesizer};
use crate::services::score_aggregator::{validate_weights, ScoreAggregator};
use crate::services::target_catalog::{CatalogLimits, TargetCatalog};

/// Forward-only stage tracker. A stage can be entered once, and only after
/// every stage before it.
#[derive(Debug, Clone)]
pub struct StageTracker {
    current: PipelineStage,
    history: Vec<PipelineStage>,
}

impl Default for StageTracker {
    fn default() -> Self {
        Self {
            current: PipelineStage::Initialized,
            history: vec![PipelineStage::Initialized],
        }
    }
}

impl StageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn current(&self) -> PipelineStage {
        self.current
    }

    pub fn history(&self) -> &[PipelineStage] {
        &self.history
    }

    pub fn advance(&mut self, next: PipelineStage) -> AssessmentResult<()> {
        if next <= self.current {
            return Err(AssessmentError::InvalidStageTransition {
                from: self.current.to_string(),
                to: next.to_string(),
            });
        }
        info!(from = %self.current, to = %next, "Pipeline stage");
        self.current = next;
        self.history.push(next);
        Ok(())
    }
}

/// Everything a run produces.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub assessment: AggregateAssessment,
    pub report: RenderedReport,
    pub notification: NotificationOutcome,
    /// Where the document was written, if anywhere
    pub report_path: Option<PathBuf>,
    /// Stages entered, in order
    pub stages: Vec<PipelineStage>,
}

/// Builder for [`AssessmentPipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    config: Option<Config>,
    registry: Option<PersonaRegistry>,
    notifier: Option<Arc<dyn Notifier>>,
    rules: Option<Vec<CorrelationRule>>,
}

impl std::fmt::Debug for PipelineBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("config", &self.config.is_some())
            .field("registry", &self.registry.as_ref().map(PersonaRegistry::len))
            .field("notifier", &self.notifier.as_ref().map(|n| n.name().to_string()))
            .field("rules", &self.rules.as_ref().map(Vec::len))
            .finish()
    }
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Use this registry instead of building one from `config.personas`.
    pub fn registry(mut self, registry: PersonaRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Use this notifier instead of the one described by `config.notifier`.
    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Use these rules instead of `config.correlation_rules`.
    pub fn correlation_rules(mut self, rules: Vec<CorrelationRule>) -> Self {
        self.rules = Some(rules);
        self
    }

    /// Validate everything and assemble the pipeline.
    pub fn build(self) -> AssessmentResult<AssessmentPipeline> {
        let config = self.config.unwrap_or_default();

        if !config.scoring.deductions.is_valid() {
            return Err(AssessmentError::InvalidConfig(
                "severity deductions must be finite and non-negative".to_string(),
            ));
        }
        if config.runner.analysis_timeout_ms == 0 {
            return Err(AssessmentError::InvalidConfig(
                "runner.analysis_timeout_ms must be greater than 0".to_string(),
            ));
        }
        if config.catalog.load_timeout_ms == 0 {
            return Err(AssessmentError::InvalidConfig(
                "catalog.load_timeout_ms must be greater than 0".to_string(),
            ));
        }

        let registry = match self.registry {
            Some(registry) => registry,
            None => PersonaRegistry::from_config(&config.personas)?,
        };
        if registry.is_empty() {
            return Err(AssessmentError::InvalidConfig(
                "at least one persona must be registered".to_string(),
            ));
        }
        validate_weights(registry.personas(), config.weighting)?;

        let aggregator = ScoreAggregator::new(config.score_thresholds, config.weighting)?;
        let rules = self
            .rules
            .unwrap_or_else(|| config.correlation_rules.clone());
        let correlator = Correlator::new(rules, &registry)?;

        let notifier = match self.notifier {
            Some(notifier) => notifier,
            None => build_notifier(&config.notifier)?,
        };

        let registry = Arc::new(registry);
        info!(
            personas = registry.len(),
            rules = correlator.rules().len(),
            notifier = notifier.name(),
            "Assessment pipeline ready"
        );

        Ok(AssessmentPipeline {
            runner: AssessmentRunner::new(Arc::clone(&registry), RunnerSettings::from_config(&config)),
            registry,
            aggregator,
            correlator,
            prioritizer: RecommendationPrioritizer::new(config.phase_caps),
            synthesizer: ReportSynthesizer::new(&config.report),
            notifier,
            catalog_limits: CatalogLimits::from(&config.catalog),
            report: config.report,
            notify_timeout: Duration::from_millis(config.notifier.timeout_ms),
        })
    }
}

/// A validated, ready-to-run pipeline.
pub struct AssessmentPipeline {
    registry: Arc<PersonaRegistry>,
    runner: AssessmentRunner,
    aggregator: ScoreAggregator,
    correlator: Correlator,
    prioritizer: RecommendationPrioritizer,
    synthesizer: ReportSynthesizer,
    notifier: Arc<dyn Notifier>,
    catalog_limits: CatalogLimits,
    report: ReportConfig,
    notify_timeout: Duration,
}

impl std::fmt::Debug for AssessmentPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssessmentPipeline")
            .field("registry", &self.registry)
            .field("correlator", &self.correlator)
            .field("notifier", &self.notifier.name())
            .field("catalog_limits", &self.catalog_limits)
            .finish_non_exhaustive()
    }
}

impl AssessmentPipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    pub fn registry(&self) -> &PersonaRegistry {
        &self.registry
    }

    /// Run the whole pipeline over the targets listed by `source`.
    #[instrument(skip_all, fields(personas = self.registry.len()))]
    pub async fn run(
        &self,
        source: &dyn TargetSource,
        cancel: &CancellationToken,
    ) -> AssessmentResult<PipelineOutput> {
        let mut stages = StageTracker::new();

        stages.advance(PipelineStage::Cataloging)?;
        let catalog = TargetCatalog::build(source, &self.catalog_limits).await?;

        stages.advance(PipelineStage::Analyzing)?;
        let run = self.runner.run(&catalog, cancel).await;

        stages.advance(PipelineStage::Aggregating)?;
        let summaries = self.aggregator.summarize_all(&self.registry, &run);
        let overall_score = self.aggregator.aggregate(&summaries);

        stages.advance(PipelineStage::Correlating)?;
        let correlation_findings = self.correlator.correlate(&summaries);

        stages.advance(PipelineStage::Prioritizing)?;
        let prioritized_phases = self
            .prioritizer
            .prioritize(run.outcomes().flat_map(|o| o.recommendations.iter()));

        stages.advance(PipelineStage::Reporting)?;
        let assessment = AggregateAssessment {
            run_id: Uuid::new_v4(),
            overall_score,
            risk_level: overall_score.map(|s| self.aggregator.risk_for(s)),
            weighting: self.aggregator.weighting(),
            target_count: catalog.len(),
            persona_summaries: summaries,
            correlation_findings,
            prioritized_phases,
            generated_at: Utc::now(),
            partial: run.cancelled,
        };
        let report = self.synthesizer.render(&assessment)?;
        let report_path = match &self.report.output_path {
            Some(path) => {
                write_report(path, &report.document).await?;
                Some(path.clone())
            }
            None => None,
        };

        stages.advance(PipelineStage::Notifying)?;
        let notification = self.notify(&report.summary).await;

        stages.advance(PipelineStage::Done)?;
        info!(
            run_id = %assessment.run_id,
            overall_score = ?assessment.overall_score,
            partial = assessment.partial,
            "Assessment complete"
        );

        Ok(PipelineOutput {
            assessment,
            report,
            notification,
            report_path,
            stages: stages.history().to_vec(),
        })
    }

    async fn notify(&self, summary: &str) -> NotificationOutcome {
        let outcome = match tokio::time::timeout(self.notify_timeout, self.notifier.send(summary)).await
        {
            Ok(outcome) => outcome,
            Err(_) => NotificationOutcome::failed(format!(
                "delivery timed out after {}ms",
                self.notify_timeout.as_millis()
            )),
        };

        if outcome.delivered {
            info!(notifier = self.notifier.name(), "Summary delivered");
        } else {
            let error = AssessmentError::NotificationFailed(
                outcome.error.clone().unwrap_or_else(|| "unknown error".to_string()),
            );
            warn!(notifier = self.notifier.name(), error = %error, "Summary not delivered");
        }
        outcome
    }
}

async fn write_report(path: &Path, document: &str) -> AssessmentResult<()> {
    let fail = |e: std::io::Error| AssessmentError::ReportWriteFailed {
        path: path.display().to_string(),
        reason: e.to_string(),
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(fail)?;
    }
    tokio::fs::write(path, document).await.map_err(fail)?;
    info!(path = %path.display(), bytes = document.len(), "Report written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_tracker_moves_forward_only() {
        let mut stages = StageTracker::new();
        stages.advance(PipelineStage::Cataloging).unwrap();
        stages.advance(PipelineStage::Analyzing).unwrap();

        assert!(matches!(
            stages.advance(PipelineStage::Analyzing),
            Err(AssessmentError::InvalidStageTransition { .. })
        ));
        assert!(stages.advance(PipelineStage::Cataloging).is_err());
        assert_eq!(stages.current(), PipelineStage::Analyzing);
        assert_eq!(
            stages.history(),
            &[
                PipelineStage::Initialized,
                PipelineStage::Cataloging,
                PipelineStage::Analyzing
            ]
        );
    }

    #[test]
    fn test_builder_rejects_bad_deductions() {
        let mut config = Config::default();
        config.scoring.deductions.high = -1.0;
        let err = AssessmentPipeline::builder().config(config).build().unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_builder_rejects_weighted_without_weights() {
        let config = Config {
            weighting: crate::domain::models::Weighting::Weighted,
            ..Config::default()
        };
        let err = AssessmentPipeline::builder().config(config).build().unwrap_err();
        assert!(matches!(err, AssessmentError::InvalidWeights(_)));
    }

    #[test]
    fn test_builder_rejects_nan_weight_in_uniform_mode() {
        let mut config = Config::default();
        config.personas[0].weight = Some(f64::NAN);
        let err = AssessmentPipeline::builder().config(config).build().unwrap_err();
        assert!(matches!(err, AssessmentError::InvalidWeights(_)));
    }

    #[test]
    fn test_builder_from_default_config() {
        let pipeline = AssessmentPipeline::builder().build().unwrap();
        assert_eq!(pipeline.registry().len(), 4);
    }
}
