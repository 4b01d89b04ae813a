//! StdoutSink - writes messages to the standard streams

use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard, PoisonError};

use contracts::{globals, LogSink};
use observability::record_sink_write;

use crate::metrics::SinkMetrics;

type Stream = Box<dyn Write + Send>;

/// Sink that prints to stdout, or stderr for error messages
///
/// stdout is flushed after each write only when the process-wide
/// `flush_stdout_on_print` toggle is set; stderr is written unbuffered.
pub struct StdoutSink {
    name: String,
    out: Mutex<Stream>,
    err: Mutex<Stream>,
    metrics: SinkMetrics,
}

impl StdoutSink {
    /// Create a sink bound to the process stdout/stderr
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_streams(name, Box::new(io::stdout()), Box::new(io::stderr()))
    }

    /// Create a sink writing to arbitrary streams
    pub fn with_streams(name: impl Into<String>, out: Stream, err: Stream) -> Self {
        Self {
            name: name.into(),
            out: Mutex::new(out),
            err: Mutex::new(err),
            metrics: SinkMetrics::new(),
        }
    }

    pub fn metrics(&self) -> &SinkMetrics {
        &self.metrics
    }

    fn print(&self, message: &str, is_error: bool) -> io::Result<()> {
        if is_error {
            let mut err = lock(&self.err);
            err.write_all(message.as_bytes())
        } else {
            let mut out = lock(&self.out);
            out.write_all(message.as_bytes())?;
            if globals::flush_stdout_on_print() {
                out.flush()?;
            }
            Ok(())
        }
    }
}

fn lock(stream: &Mutex<Stream>) -> MutexGuard<'_, Stream> {
    stream.lock().unwrap_or_else(PoisonError::into_inner)
}

impl LogSink for StdoutSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn write(&self, message: &str, is_error: bool) {
        if !self.should_log(is_error) {
            return;
        }
        // A closed pipe must not take the process down
        let ok = self.print(message, is_error).is_ok();
        if ok {
            self.metrics.inc_write_count();
        } else {
            self.metrics.inc_failure_count();
        }
        record_sink_write(&self.name, ok);
    }

    fn flush_output(&self) {
        let _ = lock(&self.out).flush();
        let _ = lock(&self.err).flush();
    }
}
