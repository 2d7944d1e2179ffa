// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # Sett Scenario Runner
//!
//! Entry point for the `sett` binary. Parses CLI arguments, initializes
//! logging and metrics, and dispatches to a subcommand:
//!
//! - `simulate`: replay a JSON scenario against an in-memory vault
//! - `check`: load and validate a vault config file
//! - `version`: print build version information

mod cli;
mod logging;
mod metrics;
mod scenario;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use sett_protocol::config::VaultConfig;

use cli::{Commands, SettCli};
use metrics::VaultMetrics;
use scenario::Scenario;

fn main() -> Result<()> {
    let cli = SettCli::parse();
    logging::init_logging(cli.log_format);

    match cli.command {
        Commands::Simulate(args) => simulate(args),
        Commands::Check(args) => check(args),
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Replays a scenario and prints its report. Fails when any step's
/// outcome differs from its `expect`.
fn simulate(args: cli::SimulateArgs) -> Result<()> {
    let json = read(&args.scenario)?;
    let scenario = Scenario::from_json(&json)
        .with_context(|| format!("failed to parse {}", args.scenario.display()))?;

    let config = match &args.config {
        Some(path) => Some(load_config(path)?),
        None => None,
    };

    let metrics = VaultMetrics::new().context("failed to register metrics")?;
    let report = scenario::run(&scenario, config, &metrics)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render());
    }
    if args.metrics {
        print!("{}", metrics.encode().context("failed to encode metrics")?);
    }

    if report.mismatches > 0 {
        anyhow::bail!(
            "{} of {} steps did not match their expected outcome",
            report.mismatches,
            report.outcomes.len()
        );
    }
    Ok(())
}

/// Validates a vault config file and prints who holds which role.
fn check(args: cli::CheckArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    tracing::info!(path = %args.config.display(), "config is valid");

    println!("vault              : {}", config.vault);
    println!("asset              : {}", config.asset_symbol);
    println!("governance         : {}", config.governance);
    println!("guardian           : {}", config.guardian);
    println!("strategist         : {}", config.strategist);
    println!("keeper             : {}", config.keeper);
    println!("withdrawal fee bps : {}", config.withdrawal_fee_bps);
    Ok(())
}

fn load_config(path: &Path) -> Result<VaultConfig> {
    let json = read(path)?;
    VaultConfig::from_json(&json).with_context(|| format!("invalid vault config {}", path.display()))
}

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn print_version() {
    println!("sett     {}", env!("CARGO_PKG_VERSION"));
    println!("protocol {}", sett_protocol::config::PROTOCOL_VERSION);
}
