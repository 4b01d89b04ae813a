//! Process-wide capture engine lifecycle
//!
//! The embedding application calls [`init`] once at start-up and passes the
//! returned handle to whatever needs it. [`handle`] is for code that cannot be
//! handed one explicitly.

use std::sync::{Arc, PoisonError, RwLock};

use contracts::{CaptureConfig, ContractError, FrameClock, Validate};
use tracing::info;

use crate::engine::CaptureEngine;
use crate::error::CaptureError;

/// Shared reference to the capture engine; usable directly as a `LogSink`
pub type CaptureHandle = Arc<CaptureEngine>;

static GLOBAL: RwLock<Option<CaptureHandle>> = RwLock::new(None);

/// Create and install the global capture engine
///
/// The calling thread becomes the engine's owning thread.
pub fn init(
    config: &CaptureConfig,
    clock: Arc<dyn FrameClock>,
) -> Result<CaptureHandle, CaptureError> {
    if !config.enabled {
        return Err(CaptureError::Disabled);
    }
    config
        .validate()
        .map_err(|e| ContractError::config_validation("capture", e.to_string()))?;

    let mut global = GLOBAL.write().unwrap_or_else(PoisonError::into_inner);
    if global.is_some() {
        return Err(CaptureError::AlreadyInitialized);
    }

    let engine = Arc::new(CaptureEngine::new(config, clock));
    *global = Some(engine.clone());
    info!(mode = %engine.mode(), "Capture engine initialized");
    Ok(engine)
}

/// The installed engine, if any
pub fn handle() -> Option<CaptureHandle> {
    GLOBAL
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Detach the global engine
///
/// Handles already given out stay valid until dropped; a later [`init`] may
/// install a fresh engine.
pub fn shutdown() -> Option<CaptureHandle> {
    let engine = GLOBAL
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .take();
    if let Some(engine) = &engine {
        info!(stats = ?engine.stats(), "Capture engine shut down");
    }
    engine
}
