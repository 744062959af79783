//! Built-in analyzers.
//!
//! Both are heuristics over raw text. They hold only compiled, immutable
//! state, so one instance serves every concurrent invocation.

pub mod pattern;
pub mod structure;

pub use pattern::PatternAnalyzer;
pub use structure::StructureAnalyzer;
