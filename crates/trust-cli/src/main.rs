mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use trust_pipeline::config::TrustConfig;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// TOML config file (defaults plus TRUST_* environment overrides when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a JSON array of gate inputs through the extraction gate
    Gate {
        file: PathBuf,
    },
    /// Validate a sanad document
    ValidateSanad {
        file: PathBuf,
    },
    /// Validate a claim document
    ValidateClaim {
        file: PathBuf,
    },
    /// Grade a sanad against a JSON array of evidence records
    Grade {
        sanad: PathBuf,
        #[arg(long)]
        evidence: PathBuf,
    },
    /// Replay a scripted debate and report the outcome
    Debate {
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &args.config {
        Some(path) => TrustConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => TrustConfig::from_env().context("reading TRUST_* environment")?,
    };
    info!(
        min_confidence = %config.gate.min_confidence,
        min_dhabt = %config.gate.min_dhabt,
        max_rounds = config.debate.max_rounds,
        "trust-cli starting"
    );

    let report = match &args.command {
        Command::Gate { file } => commands::gate(&config, file)?,
        Command::ValidateSanad { file } => commands::validate_sanad(file)?,
        Command::ValidateClaim { file } => commands::validate_claim(file)?,
        Command::Grade { sanad, evidence } => commands::grade(sanad, evidence)?,
        Command::Debate { file } => commands::debate(&config, file)?,
    };

    println!("{}", serde_json::to_string_pretty(&report.body)?);
    if let Some(failure) = report.failure {
        anyhow::bail!(failure);
    }
    Ok(())
}
