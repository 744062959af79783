//! Domain layer for the Conclave assessment pipeline
//!
//! Models, errors, and the ports that infrastructure adapters implement.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{AnalysisFailure, AssessmentError, AssessmentResult};
