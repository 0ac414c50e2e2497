//! Firehose - telemetry ingestion core
//!
//! # Usage
//!
//! ```bash
//! # Load, validate and print the effective configuration
//! firehose check --config configs/firehose.toml
//!
//! # Build the engine in-process and replay the acceptance scenarios
//! firehose smoke
//! FIREHOSE_CONFIG=configs/firehose.toml firehose smoke --timeout-ms 500
//! ```

mod cmd;
mod engine;

use std::path::Path;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use firehose_config::{Config, ConfigError, LogFormat};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Firehose - telemetry ingestion core
#[derive(Parser, Debug)]
#[command(name = "firehose")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file (falls back to $FIREHOSE_CONFIG, then defaults)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error). Overrides config file.
    #[arg(short, long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load, validate and print the effective configuration
    Check(cmd::check::CheckArgs),

    /// Run the ingestion scenarios against an in-process engine
    Smoke(cmd::smoke::SmokeArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Check(args) => {
            // Check doesn't need logging - just outputs to stdout
            cmd::check::run(args, &config)
        }
        Command::Smoke(args) => {
            let directives = config.log.directives(cli.log_level.as_deref());
            init_logging(&directives, config.log.format)?;
            cmd::smoke::run(args, &config).await
        }
    }
}

/// Resolve configuration: explicit path > $FIREHOSE_CONFIG > defaults
fn load_config(path: Option<&Path>) -> Result<Config> {
    if let Some(path) = path {
        if !path.exists() {
            anyhow::bail!("config file not found: {}", path.display());
        }
        return Config::from_file(path).context("failed to load configuration");
    }

    match Config::from_env() {
        Ok(config) => Ok(config),
        Err(ConfigError::MissingEnv { .. }) => Ok(Config::default()),
        Err(e) => Err(e).context("failed to load configuration from $FIREHOSE_CONFIG"),
    }
}

/// Initialize the tracing subscriber for logging
fn init_logging(directives: &str, format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_new(directives)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    match format {
        LogFormat::Console => tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_thread_ids(false))
            .with(filter)
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(fmt::layer().json().with_target(true))
            .with(filter)
            .init(),
    }

    Ok(())
}
