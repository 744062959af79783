pub mod assessment;
pub mod builtin_personas;
pub mod config;
pub mod correlation;
pub mod finding;
pub mod outcome;
pub mod persona;
pub mod target;

pub use assessment::{
    AggregateAssessment, CorrelationFinding, PersonaSummary, PhaseCaps, PipelineStage,
    PrioritizedPhase, RiskLevel, ScoreThresholds, Weighting,
};
pub use config::{
    AnalyzerConfig, CatalogConfig, Config, LoggingConfig, NotifierConfig, NotifierKind,
    PatternRule, PersonaConfig, RecommendationTemplate, ReportConfig, RunnerConfig,
    ScoringConfig, StructureLimits,
};
pub use correlation::{CorrelationRule, CustomCondition, ScoreCondition};
pub use finding::{Finding, Priority, Recommendation, Severity};
pub use outcome::{
    AnalysisContext, AnalysisOutcome, OutcomeBuilder, PairResult, SeverityDeductions, SkipReason,
    SkippedPair, MAX_SCORE,
};
pub use persona::Persona;
pub use target::Target;
