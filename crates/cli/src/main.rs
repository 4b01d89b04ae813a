//! # logcore CLI
//!
//! Command-line entry point.
//!
//! Provides:
//! - Configuration loading and validation
//! - A live session: producer threads, frame ticker, capture subscribers
//! - Graceful shutdown on Ctrl-C

mod cli;
mod commands;
mod error;
mod pipeline;

use anyhow::Result;
use clap::Parser;
use observability::DiagnosticsConfig;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_info, run_pipeline, run_validate};

// Current-thread runtime: the frame ticker, registration and flush all stay on
// the main thread, which owns the capture engine.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    init_logging(&cli)?;

    info!(version = env!("CARGO_PKG_VERSION"), "logcore starting");

    let result = match &cli.command {
        Commands::Run(args) => run_pipeline(args).await,
        Commands::Validate(args) => run_validate(args),
        Commands::Info(args) => run_info(args),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}

/// Initialize the engine's own diagnostics
///
/// Diagnostics go to stderr; stdout belongs to the `stdout` sink.
fn init_logging(cli: &Cli) -> Result<()> {
    let format = match cli.log_format {
        cli::LogFormat::Json => observability::LogFormat::Json,
        cli::LogFormat::Pretty => observability::LogFormat::Pretty,
        cli::LogFormat::Compact => observability::LogFormat::Compact,
    };
    observability::init_with_config(
        DiagnosticsConfig::from_verbosity(cli.verbose, cli.quiet).with_format(format),
    )
}
