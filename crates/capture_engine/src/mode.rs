//! Capture mode state machine

use std::fmt;

/// Delivery policy, derived from registry occupancy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CaptureMode {
    /// Nobody listens; writes are dropped
    Off = 0,
    /// Only immediate subscribers; events are delivered synchronously
    Passthrough = 1,
    /// Buffered subscribers (or warm-up); events wait for `flush`
    Buffering = 2,
}

impl CaptureMode {
    /// Mode for the given occupancy
    ///
    /// Buffering wins whenever buffered subscribers exist or warm-up is active.
    pub fn derive(immediate_occupied: bool, buffered_occupied: bool, warming_up: bool) -> Self {
        if buffered_occupied || warming_up {
            Self::Buffering
        } else if immediate_occupied {
            Self::Passthrough
        } else {
            Self::Off
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Passthrough => "passthrough",
            Self::Buffering => "buffering",
        }
    }

    pub(crate) fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Passthrough,
            2 => Self::Buffering,
            _ => Self::Off,
        }
    }
}

impl fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_covers_all_occupancies() {
        for immediate in [false, true] {
            for buffered in [false, true] {
                let mode = CaptureMode::derive(immediate, buffered, false);
                let expected = match (immediate, buffered) {
                    (_, true) => CaptureMode::Buffering,
                    (true, false) => CaptureMode::Passthrough,
                    (false, false) => CaptureMode::Off,
                };
                assert_eq!(mode, expected);
            }
        }
    }

    #[test]
    fn test_warmup_forces_buffering() {
        assert_eq!(CaptureMode::derive(false, false, true), CaptureMode::Buffering);
        assert_eq!(CaptureMode::derive(true, false, true), CaptureMode::Buffering);
    }

    #[test]
    fn test_u8_mirror() {
        for mode in [CaptureMode::Off, CaptureMode::Passthrough, CaptureMode::Buffering] {
            assert_eq!(CaptureMode::from_u8(mode as u8), mode);
        }
    }
}
