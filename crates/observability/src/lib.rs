//! # Observability
//!
//! Diagnostics for the logging core itself: Tracing + Prometheus metrics.
//!
//! ## Features
//!
//! - Tracing initialisation (JSON/Pretty/Compact formats)
//! - Prometheus metrics export
//! - Capture/flush/sink metrics and in-memory flush statistics
//!
//! ## Usage
//!
//! ```ignore
//! use observability::{init_with_config, metrics, DiagnosticsConfig};
//!
//! init_with_config(DiagnosticsConfig::from_verbosity(1, false))?;
//!
//! let delivered = engine.flush();
//! metrics::record_flush(delivered.events, delivered.deliveries);
//! ```

pub mod metrics;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

// Re-exports
pub use crate::metrics::{
    record_backups_pruned, record_event_emitted, record_events_discarded, record_flush,
    record_mode_transition, record_pending_events, record_sink_dropped, record_sink_write,
    record_subscriber_failure, FlushStatsAggregator, FlushSummary, RunningStats, StatsSummary,
};

/// Diagnostics configuration
#[derive(Debug, Clone)]
pub struct DiagnosticsConfig {
    /// Output format
    pub log_format: LogFormat,
    /// Level used when `RUST_LOG` is unset
    pub default_log_level: String,
    /// Ignore `RUST_LOG` and use `default_log_level` as-is
    pub force_level: bool,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Compact,
            default_log_level: "info".to_string(),
            force_level: false,
        }
    }
}

impl DiagnosticsConfig {
    /// Map `-v` counts and `--quiet` onto a level
    ///
    /// Quiet wins over verbosity and is not overridden by `RUST_LOG`.
    pub fn from_verbosity(verbose: u8, quiet: bool) -> Self {
        let level = match (quiet, verbose) {
            (true, _) => "warn",
            (false, 0) => "info",
            (false, 1) => "debug",
            (false, _) => "trace",
        };
        Self {
            default_log_level: level.to_string(),
            force_level: quiet,
            ..Self::default()
        }
    }

    pub fn with_format(mut self, log_format: LogFormat) -> Self {
        self.log_format = log_format;
        self
    }

    fn filter(&self) -> EnvFilter {
        if self.force_level {
            return EnvFilter::new(&self.default_log_level);
        }
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.default_log_level))
    }
}

/// Diagnostics format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON structured logs
    Json,
    /// Human readable
    Pretty,
    /// Compact single line
    #[default]
    Compact,
}

/// Install the global tracing subscriber
///
/// Diagnostics are written to stderr so they never interleave with messages
/// that a `StdoutSink` prints.
pub fn init_with_config(config: DiagnosticsConfig) -> Result<()> {
    let fmt_layer = match config.log_format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .boxed(),
        LogFormat::Pretty => fmt::layer().pretty().with_writer(std::io::stderr).boxed(),
        LogFormat::Compact => fmt::layer()
            .compact()
            .with_writer(std::io::stderr)
            .with_thread_names(true)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(config.filter())
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize tracing subscriber")?;

    tracing::debug!(
        log_format = ?config.log_format,
        level = %config.default_log_level,
        "Diagnostics initialized"
    );
    Ok(())
}

/// Install the Prometheus recorder and its scrape endpoint
///
/// Until this runs, the `record_*` helpers go to the no-op recorder.
pub fn init_metrics(port: u16) -> Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install()
        .with_context(|| format!("Failed to install Prometheus recorder on port {port}"))?;

    tracing::info!(port, "Prometheus metrics endpoint initialized");
    Ok(())
}
