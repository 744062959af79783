//! Domain errors for the Conclave assessment pipeline.

use thiserror::Error;

/// Errors raised by the assessment pipeline and its components.
///
/// Configuration variants (`DuplicatePersona`, `UnknownPersonaReference`,
/// `InvalidWeights`, `InvalidThresholds`, `InvalidPattern`, `InvalidConfig`)
/// are raised while the pipeline is being built, before any target is read.
/// Per-pair variants (`TargetUnavailable`, `AnalysisFailed`) are recorded as
/// skips by the runner and never abort a run.
#[derive(Debug, Error)]
pub enum AssessmentError {
    #[error("Target unavailable: {target_id}: {reason}")]
    TargetUnavailable { target_id: String, reason: String },

    #[error("Analysis failed for persona '{persona_id}' on target '{target_id}': {reason}")]
    AnalysisFailed {
        persona_id: String,
        target_id: String,
        reason: String,
    },

    #[error("Duplicate persona id: {0}")]
    DuplicatePersona(String),

    #[error("Correlation rule {rule_index} references unknown persona '{persona_id}'")]
    UnknownPersonaReference { rule_index: usize, persona_id: String },

    #[error("Invalid persona weights: {0}")]
    InvalidWeights(String),

    #[error("Invalid score thresholds: {0}")]
    InvalidThresholds(String),

    #[error("Invalid pattern '{pattern}' for persona '{persona_id}': {reason}")]
    InvalidPattern {
        persona_id: String,
        pattern: String,
        reason: String,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Target catalog is empty: nothing to assess")]
    EmptyCatalog,

    #[error("Target listing failed: {0}")]
    CatalogUnavailable(String),

    #[error("Notification failed: {0}")]
    NotificationFailed(String),

    #[error("Failed to write report to {path}: {reason}")]
    ReportWriteFailed { path: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Pipeline cannot move from stage '{from}' to '{to}'")]
    InvalidStageTransition { from: String, to: String },
}

impl AssessmentError {
    /// Whether this error belongs to the configuration family that must be
    /// reported before any analysis starts.
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::DuplicatePersona(_)
                | Self::UnknownPersonaReference { .. }
                | Self::InvalidWeights(_)
                | Self::InvalidThresholds(_)
                | Self::InvalidPattern { .. }
                | Self::InvalidConfig(_)
        )
    }
}

pub type AssessmentResult<T> = Result<T, AssessmentError>;

impl From<serde_json::Error> for AssessmentError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}

/// Reason an analyzer could not produce an outcome for one pair.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct AnalysisFailure {
    pub reason: String,
}

impl AnalysisFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}
