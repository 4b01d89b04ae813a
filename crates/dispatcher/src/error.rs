//! Dispatcher error types

use thiserror::Error;

/// Dispatcher-specific errors
///
/// Only raised while assembling sinks. Once built, sinks never surface errors
/// to producers.
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Sink creation error
    #[error("failed to create sink '{name}': {message}")]
    SinkCreation { name: String, message: String },

    /// Contract-level error (configuration parameters)
    #[error("sink error: {0}")]
    Contract(#[from] contracts::ContractError),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl DispatcherError {
    /// Create a sink creation error
    pub fn sink_creation(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkCreation {
            name: name.into(),
            message: message.into(),
        }
    }
}
