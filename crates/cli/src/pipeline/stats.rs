//! Session statistics.

use std::time::Duration;

use capture_engine::CaptureStats;
use dispatcher::MetricsSnapshot;
use observability::FlushStatsAggregator;

/// Statistics from a session run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Frames ticked
    pub frames: u64,

    /// Messages and structured errors written by producers
    pub messages_written: u64,

    /// Events seen by the immediate demo subscriber
    pub immediate_events: u64,

    /// Events seen by the buffered demo subscriber
    pub buffered_events: u64,

    /// Whether the session ended on a shutdown signal
    pub interrupted: bool,

    /// Total duration of the session
    pub duration: Duration,

    /// Number of sinks in the root fan-out
    pub active_sinks: usize,

    /// Root fan-out counters
    pub fanout: MetricsSnapshot,

    /// Capture engine counters, when capture is enabled
    pub capture: Option<CaptureStats>,

    /// Per-flush aggregation
    pub flushes: FlushStatsAggregator,
}

impl PipelineStats {
    /// Frames per second actually achieved
    pub fn fps(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.frames as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                     Session Statistics                       ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Frames: {} ({:.2} fps)", self.frames, self.fps());
        println!("   ├─ Messages written: {}", self.messages_written);
        println!("   ├─ Interrupted: {}", self.interrupted);
        println!("   └─ Active sinks: {}", self.active_sinks);

        println!("\nFan-out");
        println!("   ├─ Child deliveries: {}", self.fanout.write_count);
        println!("   └─ Child panics: {}", self.fanout.failure_count);

        match &self.capture {
            Some(capture) => {
                println!("\nCapture");
                println!("   ├─ Emitted: {}", capture.emitted);
                println!("   ├─ Buffered: {}", capture.buffered);
                println!("   ├─ Delivered: {}", capture.delivered);
                println!("   ├─ Dropped: {}", capture.dropped);
                println!("   ├─ Subscriber failures: {}", capture.subscriber_failures);
                println!("   ├─ Immediate subscriber saw: {}", self.immediate_events);
                println!("   └─ Buffered subscriber saw: {}", self.buffered_events);

                println!("\n{}", self.flushes.summary());
            }
            None => println!("\nCapture disabled"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fps() {
        let stats = PipelineStats {
            frames: 120,
            duration: Duration::from_secs(2),
            ..Default::default()
        };
        assert!((stats.fps() - 60.0).abs() < 1e-9);
        assert_eq!(PipelineStats::default().fps(), 0.0);
    }
}
