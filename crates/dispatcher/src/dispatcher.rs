//! Dispatcher - assembles configured sinks into the process fan-out

use std::sync::Arc;

use tracing::{info, instrument};

use contracts::{LogSink, SinkConfig, SinkType};

use crate::error::DispatcherError;
use crate::sinks::{FanoutSink, RotatingFileSink, StdoutSink};

/// Dispatcher configuration
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Name of the root fan-out
    pub name: String,
    /// Sink configurations, in delivery order
    pub sinks: Vec<SinkConfig>,
}

/// Builder for the root fan-out sink
pub struct DispatcherBuilder {
    config: DispatcherConfig,
    capture: Option<Arc<dyn LogSink>>,
}

impl DispatcherBuilder {
    /// Create a new DispatcherBuilder
    pub fn new(config: DispatcherConfig) -> Self {
        Self {
            config,
            capture: None,
        }
    }

    /// Provide the capture engine used for `capture` sink entries
    pub fn with_capture(mut self, capture: Arc<dyn LogSink>) -> Self {
        self.capture = Some(capture);
        self
    }

    /// Build the fan-out
    #[instrument(
        name = "dispatcher_builder_build",
        skip(self),
        fields(sink_count = self.config.sinks.len())
    )]
    pub fn build(self) -> Result<FanoutSink, DispatcherError> {
        let mut children = Vec::with_capacity(self.config.sinks.len());
        for sink_config in &self.config.sinks {
            children.push(create_sink(sink_config, self.capture.as_ref())?);
        }

        info!(
            name = %self.config.name,
            sinks = children.len(),
            "Dispatcher assembled"
        );
        Ok(FanoutSink::new(self.config.name, children))
    }
}

/// Create a sink from configuration
#[instrument(
    name = "dispatcher_create_sink",
    skip(config, capture),
    fields(sink = %config.name, sink_type = ?config.sink_type)
)]
fn create_sink(
    config: &SinkConfig,
    capture: Option<&Arc<dyn LogSink>>,
) -> Result<Arc<dyn LogSink>, DispatcherError> {
    match config.sink_type {
        SinkType::Stdout => Ok(Arc::new(StdoutSink::new(&config.name))),
        SinkType::RotatingFile => {
            let sink = RotatingFileSink::from_params(&config.name, &config.params)
                .map_err(|e| DispatcherError::sink_creation(&config.name, e.to_string()))?;
            Ok(Arc::new(sink))
        }
        SinkType::Capture => capture.cloned().ok_or_else(|| {
            DispatcherError::sink_creation(&config.name, "capture engine is not available")
        }),
    }
}

/// Convenience function to create the fan-out from sink configs
pub fn create_dispatcher(
    sink_configs: Vec<SinkConfig>,
    capture: Option<Arc<dyn LogSink>>,
) -> Result<FanoutSink, DispatcherError> {
    let config = DispatcherConfig {
        name: "root".to_string(),
        sinks: sink_configs,
    };
    let builder = DispatcherBuilder::new(config);
    match capture {
        Some(capture) => builder.with_capture(capture).build(),
        None => builder.build(),
    }
}
