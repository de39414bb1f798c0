//! tempora-replay - Replay a modifier scenario against the engine.
//!
//! Usage: tempora-replay <scenario.toml> [--config engine.toml]
//!
//! Output: one JSON object per step on stdout. Logs go to stderr, or to
//! TEMPORA_LOG_PATH if set.

mod error;
mod runner;
mod scenario;

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tempora_core::{EngineConfig, config, load_config};
use tracing_subscriber::filter::EnvFilter;

use crate::error::ReplayError;
use crate::runner::Runner;
use crate::scenario::load_scenario;

#[derive(Parser)]
#[command(version, about = "Replay a modifier scenario and print one JSON line per step")]
struct Args {
    /// Scenario script (TOML with [[step]] tables)
    scenario: PathBuf,

    /// Engine config; overrides the scenario's [config] table
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// Initialize logging, writing to TEMPORA_LOG_PATH if set, otherwise stderr.
fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    if let Ok(path) = std::env::var("TEMPORA_LOG_PATH") {
        if let Ok(file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
        {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(true)
                .with_ansi(false)
                .with_writer(file)
                .init();
            return;
        }
    }

    // Fallback to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> Result<usize, ReplayError> {
    let scenario = load_scenario(&args.scenario)?;

    let engine_config = match &args.config {
        Some(path) => load_config(path)?,
        None => {
            let inline = scenario.config.unwrap_or_else(EngineConfig::default);
            config::validate(&inline)?;
            inline
        }
    };

    let mut runner = Runner::new(engine_config)?;
    let mut out = std::io::stdout().lock();
    for (index, step) in scenario.steps.iter().enumerate() {
        let record = runner.run_step(index, step)?;
        serde_json::to_writer(&mut out, &record)?;
        writeln!(out)?;
    }
    out.flush()?;
    Ok(scenario.steps.len())
}

fn main() -> ExitCode {
    init_logging();
    let args = Args::parse();

    match run(&args) {
        Ok(steps) => {
            tracing::info!(steps, scenario = %args.scenario.display(), "replay finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, scenario = %args.scenario.display(), "replay failed");
            ExitCode::FAILURE
        }
    }
}
