//! # Dispatcher
//!
//! Log output module.
//!
//! Responsibilities:
//! - Write messages to stdout/stderr and rotated log files
//! - Fan-out to multiple sinks
//! - Isolate broken sinks so they never block the remaining outputs

pub mod dispatcher;
pub mod error;
pub mod metrics;
pub mod sinks;

pub use contracts::LogSink;
pub use dispatcher::{create_dispatcher, DispatcherBuilder, DispatcherConfig};
pub use error::DispatcherError;
pub use metrics::{MetricsSnapshot, SinkMetrics};
pub use sinks::{FanoutSink, RotatingFileSink, StdoutSink};
