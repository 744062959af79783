//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines the interfaces the pipeline depends on:
//! - Analyzer: one persona's heuristics over one target
//! - TargetSource: supplies target listings and raw content
//! - Notifier: delivers the condensed summary to an external endpoint
//!
//! These traits keep the scoring and orchestration logic independent of
//! filesystems, HTTP transports, and concrete heuristics.

pub mod analyzer;
pub mod notifier;
pub mod target_source;

pub use analyzer::Analyzer;
pub use notifier::{NotificationOutcome, Notifier};
pub use target_source::{TargetContent, TargetDescriptor, TargetSource};
