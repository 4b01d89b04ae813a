//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// logcore - log capture and dispatch engine
#[derive(Parser, Debug)]
#[command(
    name = "logcore",
    author,
    version,
    about = "Log capture and dispatch engine",
    long_about = "Drives the logcore engine from a configuration file.\n\n\
                  Builds the configured sinks (stdout, rotating file, capture), \n\
                  spawns producer threads and ticks frames that flush captured \n\
                  events to buffered subscribers."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "LOGCORE_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Diagnostic output format
    #[arg(
        long,
        value_enum,
        default_value = "compact",
        global = true,
        env = "LOGCORE_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a live logging session
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "logging.toml", env = "LOGCORE_CONFIG")]
    pub config: PathBuf,

    /// Number of frames to tick (0 = until Ctrl-C)
    #[arg(long, default_value = "120", env = "LOGCORE_FRAMES")]
    pub frames: u64,

    /// Frame rate of the ticker
    #[arg(long, default_value = "60", env = "LOGCORE_FPS")]
    pub fps: f64,

    /// Number of producer threads
    #[arg(long, default_value = "4")]
    pub producers: usize,

    /// Messages written by each producer
    #[arg(long, default_value = "50")]
    pub messages: usize,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "LOGCORE_METRICS_PORT")]
    pub metrics_port: u16,

    /// Validate configuration and exit without running
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "logging.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "logging.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show sink parameters
    #[arg(long)]
    pub params: bool,
}

/// Diagnostic output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    Pretty,
    /// Compact single-line format
    #[default]
    Compact,
}
