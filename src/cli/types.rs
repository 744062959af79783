//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::cli::commands::assess::AssessArgs;

#[derive(Parser, Debug)]
#[command(name = "conclave")]
#[command(about = "Conclave - multi-persona heuristic code assessment", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .conclave/config.yaml + .conclave/local.yaml)
    #[arg(short, long, global = true, env = "CONCLAVE_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Assess files and directories with every configured persona
    Assess(AssessArgs),

    /// List configured personas and their analyzers
    Personas,
}
