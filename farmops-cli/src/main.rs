//! FarmOps command runner
//!
//! Builds an in-memory farm from a config file, applies a JSON command
//! script and prints the per-step outcomes with a dashboard report.
//!
//! Usage:
//!   farmops --config farm.json --script today.json --changes changes.jsonl

use anyhow::{Context, Result};
use clap::Parser;
use farmops_cli::{JsonLinesSink, load_script, report, run_script};
use farmops_domain::{FarmOps, FarmOpsConfig};
use serde_json::json;
use std::path::PathBuf;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "farmops")]
#[command(about = "Run FarmOps command scripts against an in-memory farm")]
struct Args {
    /// Path to a JSON config file (defaults apply when omitted)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Path to a JSON command script
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Append committed changes to this file as JSON lines (turns on the
    /// change log)
    #[arg(long)]
    changes: Option<PathBuf>,

    /// Load demo fixtures regardless of the config
    #[arg(long)]
    seed: bool,

    /// Enable verbose debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let mut config = match &args.config {
        Some(path) => FarmOpsConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => FarmOpsConfig::default(),
    };
    config.seed_fixtures |= args.seed;
    config.record_changes |= args.changes.is_some();

    let mut ops = FarmOps::from_config(&config).context("failed to load fixtures")?;

    let outcomes = match &args.script {
        Some(path) => run_script(&mut ops, load_script(path)?),
        None => Vec::new(),
    };
    let failed = outcomes.iter().filter(|outcome| !outcome.ok).count();
    info!(steps = outcomes.len(), failed, "script finished");

    let flush = match &args.changes {
        Some(path) => {
            let sink = JsonLinesSink::open(path)
                .with_context(|| format!("failed to open change log {}", path.display()))?;
            Some(ops.flush(&sink).await)
        }
        None => None,
    };

    let output = json!({
        "outcomes": outcomes,
        "report": report(&ops),
        "flush": flush,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
