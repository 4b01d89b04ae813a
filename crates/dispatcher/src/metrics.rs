//! Sink metrics for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics for a single sink
#[derive(Debug, Default)]
pub struct SinkMetrics {
    /// Total successful writes
    write_count: AtomicU64,
    /// Total write failures
    failure_count: AtomicU64,
    /// Total messages dropped because the sink is degraded
    dropped_count: AtomicU64,
}

impl SinkMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Get total write count
    pub fn write_count(&self) -> u64 {
        self.write_count.load(Ordering::Relaxed)
    }

    /// Increment write count
    pub fn inc_write_count(&self) {
        self.write_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get failure count
    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    /// Increment failure count
    pub fn inc_failure_count(&self) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get dropped count
    pub fn dropped_count(&self) -> u64 {
        self.dropped_count.load(Ordering::Relaxed)
    }

    /// Increment dropped count
    pub fn inc_dropped_count(&self) {
        self.dropped_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            write_count: self.write_count(),
            failure_count: self.failure_count(),
            dropped_count: self.dropped_count(),
        }
    }
}

/// Snapshot of sink metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub write_count: u64,
    pub failure_count: u64,
    pub dropped_count: u64,
}
