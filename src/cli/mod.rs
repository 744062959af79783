//! Command-line interface.

pub mod commands;
pub mod output;
pub mod table;
pub mod types;

pub use output::{output, print_error, CommandOutput};
pub use types::{Cli, Commands};
