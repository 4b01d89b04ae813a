//! Logging core metrics
//!
//! Thin wrappers over the `metrics` facade, plus an in-memory aggregator for
//! flush statistics. Without an installed recorder every call is a no-op.

use contracts::LogEvent;
use metrics::{counter, gauge, histogram};

/// Record an event accepted by the capture engine
pub fn record_event_emitted(event: &LogEvent, mode: &'static str) {
    counter!(
        "logcore_events_emitted_total",
        "kind" => event.kind(),
        "mode" => mode
    )
    .increment(1);
}

/// Record pending (buffered, not yet flushed) events
pub fn record_pending_events(pending: usize) {
    gauge!("logcore_events_pending").set(pending as f64);
}

/// Record buffered events thrown away because buffering stopped
pub fn record_events_discarded(count: usize) {
    if count > 0 {
        counter!("logcore_events_discarded_total").increment(count as u64);
    }
}

/// Record one flush pass
///
/// `events` is the number of events swapped out of the buffer, `deliveries`
/// the number of subscriber invocations that followed.
pub fn record_flush(events: usize, deliveries: usize) {
    counter!("logcore_flush_total").increment(1);
    counter!("logcore_flush_deliveries_total").increment(deliveries as u64);
    histogram!("logcore_flush_batch_size").record(events as f64);
}

/// Record a subscriber that failed or panicked during dispatch
pub fn record_subscriber_failure(registry: &'static str) {
    counter!(
        "logcore_subscriber_failures_total",
        "registry" => registry
    )
    .increment(1);
}

/// Record a capture mode transition
pub fn record_mode_transition(from: &'static str, to: &'static str) {
    counter!(
        "logcore_mode_transitions_total",
        "from" => from,
        "to" => to
    )
    .increment(1);
}

/// Record a sink write
pub fn record_sink_write(sink_name: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "logcore_sink_writes_total",
        "sink" => sink_name.to_string(),
        "status" => status
    )
    .increment(1);
}

/// Record a message dropped by a degraded sink
pub fn record_sink_dropped(sink_name: &str) {
    counter!(
        "logcore_sink_dropped_total",
        "sink" => sink_name.to_string()
    )
    .increment(1);
}

/// Record backups deleted by retention
pub fn record_backups_pruned(sink_name: &str, count: u64) {
    counter!(
        "logcore_backups_pruned_total",
        "sink" => sink_name.to_string()
    )
    .increment(count);
}

/// Flush statistics aggregator
///
/// Aggregates in memory so a run can print a summary at the end.
#[derive(Debug, Clone, Default)]
pub struct FlushStatsAggregator {
    /// Flush passes observed
    pub total_flushes: u64,

    /// Events delivered across all flushes
    pub total_events: u64,

    /// Subscriber invocations across all flushes
    pub total_deliveries: u64,

    /// Flushes that found the buffer empty
    pub empty_flushes: u64,

    /// Events per flush
    pub batch_stats: RunningStats,
}

impl FlushStatsAggregator {
    /// Create a new aggregator
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one flush pass
    pub fn update(&mut self, events: usize, deliveries: usize) {
        self.total_flushes += 1;
        self.total_events += events as u64;
        self.total_deliveries += deliveries as u64;
        if events == 0 {
            self.empty_flushes += 1;
        }
        self.batch_stats.push(events as f64);
    }

    /// Produce a summary report
    pub fn summary(&self) -> FlushSummary {
        FlushSummary {
            total_flushes: self.total_flushes,
            total_events: self.total_events,
            total_deliveries: self.total_deliveries,
            empty_flushes: self.empty_flushes,
            empty_rate: if self.total_flushes > 0 {
                self.empty_flushes as f64 / self.total_flushes as f64 * 100.0
            } else {
                0.0
            },
            batch_size: StatsSummary::from(&self.batch_stats),
        }
    }

    /// Reset statistics
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Flush summary
#[derive(Debug, Clone, Default)]
pub struct FlushSummary {
    pub total_flushes: u64,
    pub total_events: u64,
    pub total_deliveries: u64,
    pub empty_flushes: u64,
    pub empty_rate: f64,
    pub batch_size: StatsSummary,
}

impl std::fmt::Display for FlushSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Flush Summary ===")?;
        writeln!(f, "Flushes: {}", self.total_flushes)?;
        writeln!(f, "Events delivered: {}", self.total_events)?;
        writeln!(f, "Subscriber invocations: {}", self.total_deliveries)?;
        writeln!(
            f,
            "Empty flushes: {} ({:.2}%)",
            self.empty_flushes, self.empty_rate
        )?;
        writeln!(f, "Batch size: {}", self.batch_size)?;
        Ok(())
    }
}

/// Statistics summary
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.1}, max={:.1}, mean={:.2}, std={:.2} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Add a sample
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
