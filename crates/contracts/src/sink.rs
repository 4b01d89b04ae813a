//! LogSink trait - the destination interface every logger implements
//!
//! Sinks are shared across producer threads (`Arc<dyn LogSink>`), so every
//! method takes `&self` and implementations keep their mutable state behind
//! interior mutability. None of the methods report errors: a sink that cannot
//! record a message degrades silently instead of failing the producer.

use std::fmt;

use crate::{globals, render, ErrorRecord};

/// Log destination
pub trait LogSink: Send + Sync {
    /// Sink name (used for diagnostics/metrics)
    fn name(&self) -> &str;

    /// Filtering hook, consulted before any formatting work is done
    fn should_log(&self, is_error: bool) -> bool {
        globals::should_log(is_error)
    }

    /// Record an already rendered message, written verbatim
    fn write(&self, message: &str, is_error: bool);

    /// Record a structured error
    ///
    /// The default renders the record into a headline and a location line and
    /// writes both as error messages.
    fn write_error(&self, record: &ErrorRecord) {
        if !self.should_log(true) {
            return;
        }
        self.write(&record.headline(), true);
        self.write(&record.location(), true);
    }

    /// Render and record a message built with `format_args!`
    fn write_args(&self, args: fmt::Arguments<'_>, is_error: bool) {
        if !self.should_log(is_error) {
            return;
        }
        self.write(&render(args), is_error);
    }

    /// Push buffered output to its destination
    fn flush_output(&self) {}
}
