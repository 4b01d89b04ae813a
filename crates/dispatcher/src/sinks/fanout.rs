//! FanoutSink - broadcasts every message to a set of child sinks

use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, PoisonError, RwLock};

use contracts::{describe_panic, ErrorRecord, LogSink};
use tracing::warn;

use crate::metrics::SinkMetrics;

/// Sink that forwards to its children in registration order
///
/// Delivery walks a snapshot of the child list, so a child may call back into
/// the fan-out (even [`add_sink`](Self::add_sink)) without deadlocking. A
/// panicking child is isolated and the remaining children still receive the
/// message.
pub struct FanoutSink {
    name: String,
    children: RwLock<Vec<Arc<dyn LogSink>>>,
    metrics: SinkMetrics,
}

impl FanoutSink {
    pub fn new(name: impl Into<String>, children: Vec<Arc<dyn LogSink>>) -> Self {
        Self {
            name: name.into(),
            children: RwLock::new(children),
            metrics: SinkMetrics::new(),
        }
    }

    /// Append a child; it receives every message written from now on
    pub fn add_sink(&self, sink: Arc<dyn LogSink>) {
        self.children
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(sink);
    }

    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Child names in delivery order
    pub fn sink_names(&self) -> Vec<String> {
        self.snapshot()
            .iter()
            .map(|child| child.name().to_string())
            .collect()
    }

    /// Failure counters cover panicking children
    pub fn metrics(&self) -> &SinkMetrics {
        &self.metrics
    }

    fn snapshot(&self) -> Vec<Arc<dyn LogSink>> {
        self.children
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn broadcast(&self, deliver: impl Fn(&dyn LogSink)) {
        for child in self.snapshot() {
            match catch_unwind(AssertUnwindSafe(|| deliver(child.as_ref()))) {
                Ok(()) => self.metrics.inc_write_count(),
                Err(payload) => {
                    self.metrics.inc_failure_count();
                    warn!(
                        sink = %self.name,
                        child = %child.name(),
                        panic = %describe_panic(&*payload),
                        "Child sink panicked, continuing with the rest"
                    );
                }
            }
        }
    }
}

impl LogSink for FanoutSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn write(&self, message: &str, is_error: bool) {
        if !self.should_log(is_error) {
            return;
        }
        self.broadcast(|child| child.write(message, is_error));
    }

    // Children render (or capture) the structured record themselves
    fn write_error(&self, record: &ErrorRecord) {
        if !self.should_log(true) {
            return;
        }
        self.broadcast(|child| child.write_error(record));
    }

    fn flush_output(&self) {
        self.broadcast(|child| child.flush_output());
    }
}

impl fmt::Debug for FanoutSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FanoutSink")
            .field("name", &self.name)
            .field("children", &self.sink_names())
            .field("metrics", &self.metrics.snapshot())
            .finish()
    }
}
