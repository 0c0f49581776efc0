//! CLI interface for hedge-recovery
//!
//! Provides subcommands for:
//! - `solve`: One-off hedge stake calculation
//! - `run`: Play a scripted operation leg by leg
//! - `config`: Show the effective configuration

mod run;
mod solve;

pub use run::RunArgs;
pub use solve::SolveArgs;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "hedge-recovery")]
#[command(about = "Progressive hedge recovery calculator for sequential bet chains")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute the hedge stake for a single target
    Solve(SolveArgs),
    /// Play a scenario file through the engine
    Run(RunArgs),
    /// Show configuration
    Config,
}

/// Report output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}
