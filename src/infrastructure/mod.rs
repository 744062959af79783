//! Infrastructure layer module
//!
//! Adapters that satisfy the domain ports and the ambient plumbing:
//! - Built-in analyzers (regex patterns, file structure)
//! - Target sources (filesystem, in-memory)
//! - Notifiers (webhook, log, disabled)
//! - Configuration loading
//! - Logging setup

pub mod analyzers;
pub mod config;
pub mod logging;
pub mod notifiers;
pub mod sources;
