//! Frame clock - source of the counter stamped on buffered events

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonically non-decreasing frame counter
///
/// Implemented by whatever schedules frames; the capture engine only reads it.
pub trait FrameClock: Send + Sync {
    fn frames_drawn(&self) -> u64;
}

/// Clock for processes without a frame scheduler; always reads zero
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFrameClock;

impl FrameClock for NoFrameClock {
    fn frames_drawn(&self) -> u64 {
        0
    }
}

/// Counter advanced explicitly by the owning thread
#[derive(Debug, Default)]
pub struct ManualFrameClock {
    frames: AtomicU64,
}

impl ManualFrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a given frame
    pub fn starting_at(frame: u64) -> Self {
        Self {
            frames: AtomicU64::new(frame),
        }
    }

    /// Advance by one frame, returning the new value
    pub fn advance(&self) -> u64 {
        self.frames.fetch_add(1, Ordering::AcqRel) + 1
    }
}

impl FrameClock for ManualFrameClock {
    fn frames_drawn(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_clock_advances() {
        let clock = ManualFrameClock::new();
        assert_eq!(clock.frames_drawn(), 0);
        assert_eq!(clock.advance(), 1);
        assert_eq!(clock.advance(), 2);
        assert_eq!(clock.frames_drawn(), 2);
    }

    #[test]
    fn test_starting_at() {
        let clock = ManualFrameClock::starting_at(40);
        assert_eq!(clock.frames_drawn(), 40);
        assert_eq!(NoFrameClock.frames_drawn(), 0);
    }
}
