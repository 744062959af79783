//! Configuration management infrastructure
//!
//! Hierarchical configuration using figment:
//! - Built-in defaults (personas, correlation rules, limits)
//! - YAML files under `.conclave/`
//! - `CONCLAVE_*` environment variable overrides

pub mod loader;

pub use loader::{ConfigError, ConfigLoader};
