//! Error types for CLI operations.

use capture_engine::CaptureError;
use dispatcher::DispatcherError;
use thiserror::Error;

/// CLI-specific error types
#[derive(Error, Debug)]
pub enum CliError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Invalid command-line arguments
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Capture engine could not be set up
    #[error("Capture engine setup failed: {0}")]
    Capture(#[from] CaptureError),

    /// Sinks could not be assembled
    #[error("Sink setup failed: {0}")]
    Dispatcher(#[from] DispatcherError),
}

impl CliError {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }
}
