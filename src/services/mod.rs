pub mod assessment_runner;
pub mod correlator;
pub mod persona_registry;
pub mod pipeline;
pub mod prioritizer;
pub mod report_synthesizer;
pub mod score_aggregator;
pub mod target_catalog;

pub use assessment_runner::{AssessmentRun, AssessmentRunner, RunnerSettings};
pub use correlator::Correlator;
pub use persona_registry::{PersonaRegistry, RegisteredPersona};
pub use pipeline::{AssessmentPipeline, PipelineBuilder, PipelineOutput, StageTracker};
pub use prioritizer::RecommendationPrioritizer;
pub use report_synthesizer::{RenderedReport, ReportSynthesizer};
pub use score_aggregator::{validate_weights, ScoreAggregator};
pub use target_catalog::{CatalogEntry, CatalogLimits, TargetCatalog};
