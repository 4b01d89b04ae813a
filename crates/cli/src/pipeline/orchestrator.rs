//! Session orchestrator - wires sinks, capture engine, producers and the
//! frame ticker together.
//!
//! Producers are plain threads writing through the root fan-out. The ticker
//! runs on the calling task: it advances the frame clock and flushes the
//! capture engine once per frame, which keeps flush on the engine's owning
//! thread.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::Result;
use capture_engine::{CaptureHandle, Subscriber};
use contracts::{log_error, log_info, ErrorType, LogEvent, LogSink, LoggingBlueprint, ManualFrameClock};
use dispatcher::FanoutSink;
use observability::FlushStatsAggregator;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::PipelineStats;
use crate::error::CliError;

/// Session configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The logging blueprint
    pub blueprint: LoggingBlueprint,

    /// Frames to tick (None = until shutdown signal)
    pub max_frames: Option<u64>,

    /// Time between frames
    pub frame_interval: Duration,

    /// Producer threads
    pub producers: usize,

    /// Messages per producer
    pub messages_per_producer: usize,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Demo subscribers and what they have seen
struct DemoSubscribers {
    immediate: Subscriber,
    buffered: Subscriber,
    immediate_seen: Arc<AtomicU64>,
    buffered_seen: Arc<AtomicU64>,
}

impl DemoSubscribers {
    fn new() -> Self {
        let immediate_seen = Arc::new(AtomicU64::new(0));
        let buffered_seen = Arc::new(AtomicU64::new(0));

        let seen = immediate_seen.clone();
        let immediate = Subscriber::new("console-mirror", move |event: &LogEvent| {
            seen.fetch_add(1, Ordering::Relaxed);
            if event.is_error() {
                debug!(kind = event.kind(), text = %event.text.trim_end(), "Immediate error event");
            }
            Ok(())
        });

        let seen = buffered_seen.clone();
        let buffered = Subscriber::new("frame-collector", move |_event: &LogEvent| {
            seen.fetch_add(1, Ordering::Relaxed);
            Ok(())
        });

        Self {
            immediate,
            buffered,
            immediate_seen,
            buffered_seen,
        }
    }
}

/// Main session orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the session to completion
    pub async fn run(self) -> Result<PipelineStats> {
        let start_time = Instant::now();

        if let Some(port) = self.config.metrics_port {
            observability::init_metrics(port)?;
        }

        self.config.blueprint.output.apply();

        let clock = Arc::new(ManualFrameClock::new());
        let (capture, fanout) = self.build_outputs(&clock)?;
        let fanout = Arc::new(fanout);

        info!(
            sinks = ?fanout.sink_names(),
            capture = capture.is_some(),
            "Outputs assembled"
        );

        let demo = DemoSubscribers::new();
        if let Some(engine) = &capture {
            engine.register_immediate(&demo.immediate);
            engine.register_buffered(&demo.buffered);
        }

        let stop = Arc::new(AtomicBool::new(false));
        let written = Arc::new(AtomicU64::new(0));
        let producers = self.spawn_producers(&fanout, &stop, &written);

        let mut flushes = FlushStatsAggregator::new();
        let mut frames = 0u64;
        let mut interrupted = false;

        let mut ticker = interval(self.config.frame_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let frame = clock.advance();
                    frames += 1;
                    if let Some(engine) = &capture {
                        let report = engine.flush();
                        flushes.update(report.events, report.deliveries);
                    }
                    if frame % 60 == 0 {
                        log_info!(fanout, "frame {}: {} messages so far\n", frame, written.load(Ordering::Relaxed));
                    }
                    if self.config.max_frames.is_some_and(|max| frames >= max) {
                        break;
                    }
                }
                _ = &mut shutdown => {
                    warn!("Received shutdown signal, stopping session...");
                    interrupted = true;
                    break;
                }
            }
        }

        // Producers finish their quota unless the session was interrupted
        if interrupted {
            stop.store(true, Ordering::Relaxed);
        }
        for producer in producers {
            if producer.join().is_err() {
                warn!("Producer thread panicked");
            }
        }

        // Whatever the producers wrote after the last tick
        if let Some(engine) = &capture {
            let report = engine.flush();
            flushes.update(report.events, report.deliveries);
            engine.unregister_immediate(&demo.immediate);
            engine.unregister_buffered(&demo.buffered);
        }
        fanout.flush_output();

        let stats = PipelineStats {
            frames,
            messages_written: written.load(Ordering::Relaxed),
            immediate_events: demo.immediate_seen.load(Ordering::Relaxed),
            buffered_events: demo.buffered_seen.load(Ordering::Relaxed),
            interrupted,
            duration: start_time.elapsed(),
            active_sinks: fanout.len(),
            fanout: fanout.metrics().snapshot(),
            capture: capture.as_ref().map(|engine| engine.stats()),
            flushes,
        };

        if capture.is_some() {
            capture_engine::shutdown();
        }

        Ok(stats)
    }

    /// Initialise the capture engine (if enabled) and build the root fan-out
    fn build_outputs(
        &self,
        clock: &Arc<ManualFrameClock>,
    ) -> Result<(Option<CaptureHandle>, FanoutSink), CliError> {
        let blueprint = &self.config.blueprint;

        let capture = if blueprint.capture.enabled {
            Some(capture_engine::init(&blueprint.capture, clock.clone())?)
        } else {
            None
        };

        let capture_sink = capture
            .clone()
            .map(|engine| engine as Arc<dyn LogSink>);
        let fanout = dispatcher::create_dispatcher(blueprint.sinks.clone(), capture_sink)?;
        Ok((capture, fanout))
    }

    fn spawn_producers(
        &self,
        fanout: &Arc<FanoutSink>,
        stop: &Arc<AtomicBool>,
        written: &Arc<AtomicU64>,
    ) -> Vec<JoinHandle<()>> {
        let pause = self.config.frame_interval / 2;
        (0..self.config.producers)
            .map(|id| {
                let sink = fanout.clone();
                let stop = stop.clone();
                let written = written.clone();
                let messages = self.config.messages_per_producer;
                thread::Builder::new()
                    .name(format!("producer-{id}"))
                    .spawn(move || {
                        for i in 0..messages {
                            if stop.load(Ordering::Relaxed) {
                                break;
                            }
                            if i % 10 == 9 {
                                log_error!(
                                    sink,
                                    ErrorType::Warning,
                                    "queue.len() < queue.capacity()",
                                    format!("producer {id} queue saturated at message {i}")
                                );
                            } else {
                                log_info!(sink, "[producer {}] message {}\n", id, i);
                            }
                            written.fetch_add(1, Ordering::Relaxed);
                            thread::sleep(pause);
                        }
                    })
            })
            .filter_map(|spawned| match spawned {
                Ok(handle) => Some(handle),
                Err(e) => {
                    warn!(error = %e, "Failed to spawn producer thread");
                    None
                }
            })
            .collect()
    }
}

/// Resolve on Ctrl+C or SIGTERM
///
/// A handler that cannot be installed never resolves.
async fn shutdown_signal() {
    let ctrl_c = async {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(_) => std::future::pending::<()>().await,
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
