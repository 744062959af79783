//! CLI command implementations.

pub mod assess;
pub mod personas;
