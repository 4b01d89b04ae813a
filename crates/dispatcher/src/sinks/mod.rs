//! Sink implementations
//!
//! Contains StdoutSink, RotatingFileSink, and FanoutSink.

mod fanout;
mod rotating_file;
pub(crate) mod stdout;

pub use self::fanout::FanoutSink;
pub use self::rotating_file::RotatingFileSink;
pub use self::stdout::StdoutSink;
