//! Target sources.

pub mod fs;
pub mod memory;

pub use fs::FsTargetSource;
pub use memory::InMemoryTargetSource;
