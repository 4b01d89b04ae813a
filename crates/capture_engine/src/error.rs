//! Capture engine errors

use contracts::ContractError;
use thiserror::Error;

/// Capture engine lifecycle errors
#[derive(Debug, Error)]
pub enum CaptureError {
    /// `init` was called while a global engine is installed
    #[error("capture engine already initialized")]
    AlreadyInitialized,

    /// Capture is switched off in the configuration
    #[error("capture engine is disabled by configuration")]
    Disabled,

    /// Configuration rejected
    #[error(transparent)]
    Contract(#[from] ContractError),
}
