//! # CLI Interface
//!
//! Command-line structure for `sett`, via `clap` derive.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::logging::LogFormat;

/// Sett vault scenario runner.
///
/// Replays a scripted sequence of vault calls against an in-memory asset
/// ledger and reports what each call did.
#[derive(Parser, Debug)]
#[command(
    name = "sett",
    about = "Sett vault scenario runner",
    version,
    propagate_version = true
)]
pub struct SettCli {
    /// Log format on stderr.
    #[arg(
        long,
        global = true,
        env = "SETT_LOG_FORMAT",
        value_enum,
        ignore_case = true,
        default_value_t = LogFormat::Pretty
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a scenario file and print every outcome.
    Simulate(SimulateArgs),
    /// Load and validate a vault config file.
    Check(CheckArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `simulate` subcommand.
#[derive(Parser, Debug)]
pub struct SimulateArgs {
    /// Path to the scenario file (JSON).
    #[arg(env = "SETT_SCENARIO")]
    pub scenario: PathBuf,

    /// Vault config file (JSON) that replaces the scenario's own `vault`
    /// section.
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Print the report as JSON instead of a table.
    #[arg(long)]
    pub json: bool,

    /// Dump Prometheus metrics after the run.
    #[arg(long)]
    pub metrics: bool,
}

/// Arguments for the `check` subcommand.
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Path to the vault config file (JSON).
    pub config: PathBuf,
}
