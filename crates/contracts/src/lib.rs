//! # Contracts
//!
//! Frozen interface contracts shared by every logging crate: the event model,
//! the `LogSink` trait, message formatting, process-wide output toggles, the
//! frame clock, and configuration types.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Buffered events carry the frame counter read from a [`FrameClock`]
//! - Events delivered immediately carry no stamp

mod blueprint;
mod clock;
mod error;
mod event;
mod format;
pub mod globals;
mod sink;

pub use blueprint::*;
pub use clock::{FrameClock, ManualFrameClock, NoFrameClock};
pub use error::*;
pub use event::*;
pub use format::render;
pub use sink::*;
pub use validator::Validate;
