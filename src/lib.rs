//! Conclave - multi-persona heuristic code assessment
//!
//! Conclave runs several independent "persona" analyzers (security,
//! performance, reliability, maintainability, or your own) over a set of
//! source artifacts, turns their findings into scores, and reduces those
//! into one assessment with cross-persona correlations and a phased
//! remediation plan.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): models, ports and errors
//! - **Service Layer** (`services`): catalog, runner, aggregation, correlation,
//!   prioritization, report rendering and the pipeline that chains them
//! - **Infrastructure Layer** (`infrastructure`): built-in analyzers, target
//!   sources, notifiers, configuration and logging
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```no_run
//! use conclave::domain::errors::AnalysisFailure;
//! use conclave::domain::models::{AnalysisContext, AnalysisOutcome, Persona, Severity};
//! use conclave::infrastructure::sources::InMemoryTargetSource;
//! use conclave::services::{AssessmentPipeline, PersonaRegistry};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let mut registry = PersonaRegistry::new();
//! registry.register(Persona::new("todo", "TODO hunter"), |ctx: &AnalysisContext| {
//!     let mut outcome = ctx.outcome();
//!     if ctx.target().raw_content.contains("TODO") {
//!         outcome = outcome.finding(Severity::Low, "Unfinished work");
//!     }
//!     Ok::<AnalysisOutcome, AnalysisFailure>(outcome.build())
//! })?;
//!
//! let pipeline = AssessmentPipeline::builder()
//!     .registry(registry)
//!     .correlation_rules(vec![])
//!     .build()?;
//! let source = InMemoryTargetSource::new().with_target("main.rs", "// TODO");
//! let output = pipeline.run(&source, &CancellationToken::new()).await?;
//! println!("{}", output.report.summary);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

pub use domain::errors::{AnalysisFailure, AssessmentError, AssessmentResult};
pub use domain::models::{
    AggregateAssessment, AnalysisContext, AnalysisOutcome, Config, CorrelationRule, Persona,
    PersonaSummary, PhaseCaps, Priority, RiskLevel, ScoreCondition, Severity, Target, Weighting,
};
pub use domain::ports::{Analyzer, Notifier, TargetSource};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{AssessmentPipeline, PersonaRegistry, PipelineOutput, RenderedReport};
