//! # Tidal Analysis Command Line
//!
//! Reads every station file in a directory, merges them into one record and
//! prints the sea-level rise rate and harmonic constituents.
//!
//! ```text
//! tidal-analysis data/aberdeen -v
//! tidal-analysis data/dover --json --config dover.toml
//! ```

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tidal_analysis_lib::{
    config::{Config, CONFIG_FILE},
    report::{analyze_station, print_report, render_json},
    tide_data,
};

#[derive(Parser)]
#[command(name = "tidal-analysis")]
#[command(about = "Calculate tidal constituents and relative sea-level rise from tide gauge data")]
#[command(version)]
struct Cli {
    /// Directory containing the station's .txt files
    directory: PathBuf,

    /// Print progress
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file
    #[arg(short, long, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

/// Main application entry point.
fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG still wins over the verbosity flag
    let default_level = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let config = Config::load_from_path(&cli.config);

    let series = tide_data::read_directory(&cli.directory, &config.ingest)
        .with_context(|| format!("failed to load {}", cli.directory.display()))?;

    let source = cli.directory.display().to_string();
    let report = analyze_station(&source, &series, &config)
        .with_context(|| format!("failed to analyse {source}"))?;

    if cli.json {
        println!("{}", render_json(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}
