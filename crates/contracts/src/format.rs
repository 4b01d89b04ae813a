//! Message formatting
//!
//! Rendering goes through `format_args!`, so a malformed template is rejected
//! by the compiler instead of surfacing at runtime.

use std::fmt::{self, Write};

/// Render pre-captured format arguments into an owned string
pub fn render(args: fmt::Arguments<'_>) -> String {
    // Literal-only templates skip the formatter entirely
    if let Some(literal) = args.as_str() {
        return literal.to_owned();
    }
    let mut out = String::new();
    // Writing into a String only fails if a Display impl reports an error,
    // in which case the partial output is what we have.
    let _ = out.write_fmt(args);
    out
}

/// Write a formatted info message to a sink
///
/// ```ignore
/// log_info!(sink, "loaded {} assets\n", count);
/// ```
#[macro_export]
macro_rules! log_info {
    ($sink:expr, $($arg:tt)+) => {
        {
            use $crate::LogSink as _;
            ($sink).write_args(::std::format_args!($($arg)+), false)
        }
    };
}

/// Write a formatted error message to a sink
#[macro_export]
macro_rules! log_err {
    ($sink:expr, $($arg:tt)+) => {
        {
            use $crate::LogSink as _;
            ($sink).write_args(::std::format_args!($($arg)+), true)
        }
    };
}

/// Report a structured error with the caller's source location
///
/// ```ignore
/// log_error!(sink, ErrorType::Warning, "cache.len() < limit", "cache is full");
/// ```
#[macro_export]
macro_rules! log_error {
    ($sink:expr, $kind:expr, $code:expr, $rationale:expr) => {
        {
            use $crate::LogSink as _;
            ($sink).write_error(
                &$crate::ErrorRecord::new(::std::module_path!(), ::std::file!(), ::std::line!())
                    .code($code)
                    .rationale($rationale)
                    .error_type($kind),
            )
        }
    };
    ($sink:expr, $code:expr, $rationale:expr) => {
        $crate::log_error!($sink, $crate::ErrorType::Error, $code, $rationale)
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_literal() {
        assert_eq!(render(format_args!("plain text")), "plain text");
    }

    #[test]
    fn test_render_arguments() {
        let name = "texture.png";
        let size = 2048;
        assert_eq!(
            render(format_args!("{name}: {size}x{size} ({:.1} MiB)\n", 16.0)),
            "texture.png: 2048x2048 (16.0 MiB)\n"
        );
    }
}
