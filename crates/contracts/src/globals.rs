//! Process-wide output toggles
//!
//! These are read on every write, so they are plain atomics with relaxed
//! ordering. A toggle flipped on one thread becomes visible to writers on
//! other threads eventually, which is all logging needs.

use std::sync::atomic::{AtomicBool, Ordering};

static FLUSH_STDOUT_ON_PRINT: AtomicBool = AtomicBool::new(false);
static PRINT_LINE_ENABLED: AtomicBool = AtomicBool::new(true);
static PRINT_ERROR_ENABLED: AtomicBool = AtomicBool::new(true);

/// Force a stream flush after every non-error write
pub fn set_flush_stdout_on_print(enabled: bool) {
    FLUSH_STDOUT_ON_PRINT.store(enabled, Ordering::Relaxed);
}

pub fn flush_stdout_on_print() -> bool {
    FLUSH_STDOUT_ON_PRINT.load(Ordering::Relaxed)
}

/// Enable or suppress non-error output
pub fn set_print_line_enabled(enabled: bool) {
    PRINT_LINE_ENABLED.store(enabled, Ordering::Relaxed);
}

pub fn print_line_enabled() -> bool {
    PRINT_LINE_ENABLED.load(Ordering::Relaxed)
}

/// Enable or suppress error output
pub fn set_print_error_enabled(enabled: bool) {
    PRINT_ERROR_ENABLED.store(enabled, Ordering::Relaxed);
}

pub fn print_error_enabled() -> bool {
    PRINT_ERROR_ENABLED.load(Ordering::Relaxed)
}

/// Default filtering policy shared by the sinks
pub fn should_log(is_error: bool) -> bool {
    if is_error {
        print_error_enabled()
    } else {
        print_line_enabled()
    }
}
