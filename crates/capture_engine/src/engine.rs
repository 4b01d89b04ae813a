//! Capture engine - the log sink that fans events out to subscribers.
//!
//! Mode, both registries and the pending buffer live behind one mutex.
//! Subscriber callbacks never run while it is held: every path copies what it
//! needs (a registry snapshot, the swapped-out buffer or a single slot) and
//! releases the lock before invoking anything, so a callback may log, register
//! or unregister freely.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, ThreadId};

use contracts::{describe_panic, CaptureConfig, ErrorRecord, FrameClock, LogEvent, LogSink};
use observability::metrics;
use tracing::{debug, instrument, warn};

use crate::buffer::EventBuffer;
use crate::mode::CaptureMode;
use crate::registry::Registry;
use crate::subscriber::Subscriber;

const IMMEDIATE: &str = "immediate";
const BUFFERED: &str = "buffered";

/// Counters snapshot
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CaptureStats {
    /// Events accepted while capture was not off
    pub emitted: u64,
    /// Events appended to the pending buffer
    pub buffered: u64,
    /// Successful subscriber invocations
    pub delivered: u64,
    /// Buffered events discarded because buffering stopped
    pub dropped: u64,
    /// Subscriber invocations that returned an error or panicked
    pub subscriber_failures: u64,
    /// Flush passes
    pub flushes: u64,
}

/// Outcome of one flush pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    /// Events swapped out of the buffer
    pub events: usize,
    /// Successful subscriber invocations
    pub deliveries: usize,
}

#[derive(Default)]
struct Counters {
    emitted: AtomicU64,
    buffered: AtomicU64,
    delivered: AtomicU64,
    dropped: AtomicU64,
    subscriber_failures: AtomicU64,
    flushes: AtomicU64,
}

impl Counters {
    fn snapshot(&self) -> CaptureStats {
        CaptureStats {
            emitted: self.emitted.load(Ordering::Relaxed),
            buffered: self.buffered.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            subscriber_failures: self.subscriber_failures.load(Ordering::Relaxed),
            flushes: self.flushes.load(Ordering::Relaxed),
        }
    }
}

struct CaptureState {
    mode: CaptureMode,
    immediate: Registry,
    buffered: Registry,
    buffer: EventBuffer,
    /// Last frame of the start-up warm-up; cleared once it has passed
    warmup_until: Option<u64>,
}

/// Mode change computed under the lock, reported after it is released
struct Transition {
    from: CaptureMode,
    to: CaptureMode,
    discarded: usize,
}

enum ReplayStep {
    Deliver(LogEvent),
    Registered(Option<Transition>),
}

/// Capture dispatch engine
///
/// `write` and `write_error` may be called from any thread. Registration and
/// [`flush`](Self::flush) belong to the thread that created the engine; debug
/// builds assert it.
pub struct CaptureEngine {
    name: String,
    state: Mutex<CaptureState>,
    /// Lock-free mirror of `CaptureState::mode` for the off fast path
    mode: AtomicU8,
    clock: Arc<dyn FrameClock>,
    owner: ThreadId,
    counters: Counters,
}

impl CaptureEngine {
    /// Create an engine owned by the calling thread
    #[instrument(name = "capture_engine_new", skip(clock), fields(warmup = ?config.warmup_frames))]
    pub fn new(config: &CaptureConfig, clock: Arc<dyn FrameClock>) -> Self {
        let warmup_until = config
            .warmup_frames
            .filter(|&last| clock.frames_drawn() <= last);
        let mode = CaptureMode::derive(false, false, warmup_until.is_some());

        Self {
            name: "capture".to_string(),
            state: Mutex::new(CaptureState {
                mode,
                immediate: Registry::new(),
                buffered: Registry::new(),
                buffer: EventBuffer::new(),
                warmup_until,
            }),
            mode: AtomicU8::new(mode as u8),
            clock,
            owner: thread::current().id(),
            counters: Counters::default(),
        }
    }

    /// Current mode
    pub fn mode(&self) -> CaptureMode {
        CaptureMode::from_u8(self.mode.load(Ordering::Acquire))
    }

    /// Events waiting for the next flush
    pub fn pending_events(&self) -> usize {
        self.lock_state().buffer.len()
    }

    /// Live immediate registrations
    pub fn immediate_count(&self) -> usize {
        self.lock_state().immediate.live_count()
    }

    /// Live buffered registrations
    pub fn buffered_count(&self) -> usize {
        self.lock_state().buffered.live_count()
    }

    pub fn stats(&self) -> CaptureStats {
        self.counters.snapshot()
    }

    /// Register for synchronous delivery
    ///
    /// During start-up warm-up the subscriber first receives every event
    /// already buffered, then joins the registry in the same critical section
    /// that observed the end of the buffer.
    pub fn register_immediate(&self, subscriber: &Subscriber) {
        self.assert_owner("register_immediate");

        let mut replayed = 0;
        let transition = loop {
            let step = {
                let mut state = self.lock_state();
                let pending = if state.warmup_until.is_some() {
                    state.buffer.get(replayed).cloned()
                } else {
                    None
                };
                match pending {
                    Some(event) => ReplayStep::Deliver(event),
                    None => {
                        state.immediate.insert(subscriber);
                        ReplayStep::Registered(self.recompute(&mut state))
                    }
                }
            };
            match step {
                ReplayStep::Deliver(event) => {
                    self.dispatch(subscriber, &event, IMMEDIATE);
                    replayed += 1;
                }
                ReplayStep::Registered(transition) => break transition,
            }
        };

        debug!(
            subscriber = %subscriber.name(),
            replayed,
            "Immediate subscriber registered"
        );
        self.report(transition);
    }

    /// Remove one immediate registration of `subscriber`
    pub fn unregister_immediate(&self, subscriber: &Subscriber) -> bool {
        self.assert_owner("unregister_immediate");
        let (removed, transition) = {
            let mut state = self.lock_state();
            let removed = state.immediate.remove(subscriber);
            (removed, self.recompute(&mut state))
        };
        self.report(transition);
        removed
    }

    /// Register for flush-driven delivery
    pub fn register_buffered(&self, subscriber: &Subscriber) {
        self.assert_owner("register_buffered");
        let transition = {
            let mut state = self.lock_state();
            state.buffered.insert(subscriber);
            self.recompute(&mut state)
        };
        debug!(subscriber = %subscriber.name(), "Buffered subscriber registered");
        self.report(transition);
    }

    /// Remove one buffered registration of `subscriber`
    pub fn unregister_buffered(&self, subscriber: &Subscriber) -> bool {
        self.assert_owner("unregister_buffered");
        let (removed, transition) = {
            let mut state = self.lock_state();
            let removed = state.buffered.remove(subscriber);
            (removed, self.recompute(&mut state))
        };
        self.report(transition);
        removed
    }

    /// Deliver pending events to buffered subscribers
    ///
    /// The buffer is swapped out under the lock; delivery then walks the
    /// buffered registry slot by slot, locking only to read each slot. Events
    /// logged by subscribers during the pass land in the fresh buffer and go
    /// out on the next flush.
    #[instrument(level = "trace", name = "capture_engine_flush", skip(self))]
    pub fn flush(&self) -> FlushReport {
        self.assert_owner("flush");

        let events = self.lock_state().buffer.take();
        let mut deliveries = 0;

        for event in &events {
            let mut slot = 0;
            loop {
                let subscriber = {
                    let state = self.lock_state();
                    if slot >= state.buffered.upper_bound() {
                        break;
                    }
                    state.buffered.get(slot)
                };
                slot += 1;
                if let Some(subscriber) = subscriber {
                    if self.dispatch(&subscriber, event, BUFFERED) {
                        deliveries += 1;
                    }
                }
            }
        }

        let (transition, pending) = {
            let mut state = self.lock_state();
            let transition = self.recompute(&mut state);
            (transition, state.buffer.len())
        };
        self.report(transition);

        self.counters.flushes.fetch_add(1, Ordering::Relaxed);
        metrics::record_flush(events.len(), deliveries);
        metrics::record_pending_events(pending);

        FlushReport {
            events: events.len(),
            deliveries,
        }
    }

    fn emit(&self, event: LogEvent) {
        let (mode, targets) = {
            let mut state = self.lock_state();
            let mode = state.mode;
            match mode {
                CaptureMode::Off => return,
                CaptureMode::Passthrough => {}
                CaptureMode::Buffering => {
                    let frame = self.clock.frames_drawn();
                    state.buffer.push(event.stamped(frame));
                    self.counters.buffered.fetch_add(1, Ordering::Relaxed);
                }
            }
            (mode, state.immediate.snapshot())
        };

        self.counters.emitted.fetch_add(1, Ordering::Relaxed);
        metrics::record_event_emitted(&event, mode.as_str());

        for subscriber in &targets {
            self.dispatch(subscriber, &event, IMMEDIATE);
        }
    }

    /// Invoke one subscriber, containing errors and panics
    fn dispatch(&self, subscriber: &Subscriber, event: &LogEvent, registry: &'static str) -> bool {
        let failure = match panic::catch_unwind(AssertUnwindSafe(|| subscriber.call(event))) {
            Ok(Ok(())) => None,
            Ok(Err(err)) => Some(err.to_string()),
            Err(payload) => Some(format!("panicked: {}", describe_panic(&*payload))),
        };

        match failure {
            None => {
                self.counters.delivered.fetch_add(1, Ordering::Relaxed);
                true
            }
            Some(reason) => {
                self.counters
                    .subscriber_failures
                    .fetch_add(1, Ordering::Relaxed);
                metrics::record_subscriber_failure(registry);
                warn!(
                    subscriber = %subscriber.name(),
                    registry,
                    error = %reason,
                    "Subscriber failed"
                );
                false
            }
        }
    }

    /// Re-derive the mode from occupancy; caller holds the lock
    fn recompute(&self, state: &mut CaptureState) -> Option<Transition> {
        if let Some(last) = state.warmup_until {
            if self.clock.frames_drawn() > last {
                state.warmup_until = None;
            }
        }

        let next = CaptureMode::derive(
            state.immediate.is_occupied(),
            state.buffered.is_occupied(),
            state.warmup_until.is_some(),
        );
        if next == state.mode {
            return None;
        }

        let discarded = if state.mode == CaptureMode::Buffering {
            state.buffer.clear()
        } else {
            0
        };
        let transition = Transition {
            from: state.mode,
            to: next,
            discarded,
        };
        state.mode = next;
        self.mode.store(next as u8, Ordering::Release);
        Some(transition)
    }

    fn report(&self, transition: Option<Transition>) {
        let Some(Transition { from, to, discarded }) = transition else {
            return;
        };
        if discarded > 0 {
            self.counters
                .dropped
                .fetch_add(discarded as u64, Ordering::Relaxed);
            metrics::record_events_discarded(discarded);
        }
        metrics::record_mode_transition(from.as_str(), to.as_str());
        debug!(from = %from, to = %to, discarded, "Capture mode changed");
    }

    fn lock_state(&self) -> MutexGuard<'_, CaptureState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[inline]
    fn assert_owner(&self, operation: &str) {
        debug_assert_eq!(
            thread::current().id(),
            self.owner,
            "{operation} must be called from the thread that created the capture engine"
        );
    }
}

impl LogSink for CaptureEngine {
    fn name(&self) -> &str {
        &self.name
    }

    // Print toggles gate console output only; subscribers see every event.
    fn should_log(&self, _is_error: bool) -> bool {
        true
    }

    fn write(&self, message: &str, is_error: bool) {
        if self.mode() == CaptureMode::Off {
            return;
        }
        self.emit(LogEvent::message(message, is_error));
    }

    /// Structured errors are captured as-is rather than rendered to text
    fn write_error(&self, record: &ErrorRecord) {
        if self.mode() == CaptureMode::Off {
            return;
        }
        self.emit(LogEvent::error(record.clone()));
    }
}

impl std::fmt::Debug for CaptureEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureEngine")
            .field("mode", &self.mode())
            .field("stats", &self.stats())
            .finish()
    }
}
