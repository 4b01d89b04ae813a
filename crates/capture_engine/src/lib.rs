//! # Capture Engine
//!
//! Captures log output and hands it to subscribers.
//!
//! Responsibilities:
//! - Two subscriber registries: immediate (synchronous) and buffered (per frame)
//! - Mode derived from registry occupancy (off / passthrough / buffering)
//! - Frame-driven `flush` of buffered events
//! - Process-wide `init` / `handle` / `shutdown` lifecycle
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use capture_engine::Subscriber;
//! use contracts::{CaptureConfig, LogSink, ManualFrameClock};
//!
//! let clock = Arc::new(ManualFrameClock::new());
//! let engine = capture_engine::init(&CaptureConfig::default(), clock.clone())?;
//!
//! let remote = Subscriber::new("remote", |event| {
//!     send(event)?;
//!     Ok(())
//! });
//! engine.register_buffered(&remote);
//!
//! engine.write("hello\n", false);
//!
//! // once per frame, on the owning thread
//! clock.advance();
//! engine.flush();
//! ```

mod buffer;
mod engine;
mod error;
mod global;
mod mode;
mod registry;
mod subscriber;

pub use engine::{CaptureEngine, CaptureStats, FlushReport};
pub use error::CaptureError;
pub use global::{handle, init, shutdown, CaptureHandle};
pub use mode::CaptureMode;
pub use subscriber::Subscriber;
