//! # Integration Tests
//!
//! End-to-end scenarios across crates.
//!
//! Covers:
//! - configuration -> fan-out -> file + capture delivery
//! - concurrent producers interleaved with frame flushes
//! - re-entrant subscribers and degraded sinks

#[cfg(test)]
mod support {
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    use capture_engine::Subscriber;
    use contracts::LogEvent;

    /// In-memory stream shared with the test
    #[derive(Clone, Default)]
    pub struct SharedBuf(pub Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        pub fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Subscriber recording every event it receives
    pub fn recorder(name: &str) -> (Subscriber, Arc<Mutex<Vec<LogEvent>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let sub = Subscriber::new(name, move |event: &LogEvent| {
            sink.lock().unwrap().push(event.clone());
            Ok(())
        });
        (sub, seen)
    }

    pub fn texts(events: &Mutex<Vec<LogEvent>>) -> Vec<String> {
        events.lock().unwrap().iter().map(|e| e.text.clone()).collect()
    }
}

#[cfg(test)]
mod contract_tests {
    use contracts::{ErrorRecord, ErrorType, LogEvent};

    #[test]
    fn test_event_serializes_without_empty_fields() {
        let event = LogEvent::message("ready\n", false);
        let json = serde_json::to_string(&event).unwrap();
        assert!(!json.contains("frame"));
        assert!(!json.contains("error\":"));

        let stamped = LogEvent::error(
            ErrorRecord::new("f", "f.rs", 1)
                .code("x")
                .error_type(ErrorType::Script),
        )
        .stamped(9);
        let json = serde_json::to_string(&stamped).unwrap();
        assert!(json.contains(r#""frame":9"#));
        assert!(json.contains(r#""error_type":"script""#));
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::fs;
    use std::sync::{Arc, Mutex, Weak};
    use std::thread;

    use capture_engine::{CaptureEngine, CaptureMode, Subscriber};
    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{
        log_error, log_info, CaptureConfig, ErrorType, LogEvent, LogSink, ManualFrameClock,
        NoFrameClock, RotatingFileParams,
    };
    use dispatcher::{create_dispatcher, FanoutSink, RotatingFileSink, StdoutSink};
    use tempfile::tempdir;

    use crate::support::{recorder, texts, SharedBuf};

    /// Config -> rotating file + capture, with a console sink added at runtime
    #[test]
    fn test_e2e_config_to_file_and_capture() {
        let dir = tempdir().unwrap();
        let log_path = dir.path().join("logs").join("engine.log");
        let config = format!(
            r#"
[[sinks]]
name = "file"
sink_type = "rotating_file"
[sinks.params]
base_path = "{}"
max_files = "3"

[[sinks]]
name = "capture"
sink_type = "capture"
"#,
            log_path.display().to_string().replace('\\', "/")
        );
        let blueprint = ConfigLoader::load_from_str(&config, ConfigFormat::Toml).unwrap();

        let clock = Arc::new(ManualFrameClock::new());
        let engine = Arc::new(CaptureEngine::new(&blueprint.capture, clock.clone()));
        let fanout = create_dispatcher(
            blueprint.sinks.clone(),
            Some(engine.clone() as Arc<dyn LogSink>),
        )
        .unwrap();

        let out = SharedBuf::default();
        let err = SharedBuf::default();
        fanout.add_sink(Arc::new(StdoutSink::with_streams(
            "console",
            Box::new(out.clone()),
            Box::new(err.clone()),
        )));
        assert_eq!(fanout.sink_names(), vec!["file", "capture", "console"]);

        let (remote, remote_seen) = recorder("remote");
        engine.register_buffered(&remote);

        clock.advance();
        log_info!(fanout, "loaded {} scenes\n", 3);
        log_error!(fanout, ErrorType::Error, "scene.is_valid()", "scene 2 is corrupt");
        fanout.flush_output();

        let file = fs::read_to_string(&log_path).unwrap();
        assert!(file.starts_with("loaded 3 scenes\n"));
        assert!(file.contains("USER ERROR: scene 2 is corrupt\n"));
        assert!(file.contains("   at: "));
        assert_eq!(out.contents(), "loaded 3 scenes\n");
        assert!(err.contents().starts_with("USER ERROR: scene 2 is corrupt\n"));

        // nothing reaches buffered subscribers before the frame flush
        assert!(remote_seen.lock().unwrap().is_empty());
        let report = engine.flush();
        assert_eq!(report.events, 2);

        let seen = remote_seen.lock().unwrap();
        assert_eq!(seen[0].text, "loaded 3 scenes\n");
        assert_eq!(seen[0].frame, Some(1));
        let record = seen[1].error.as_ref().unwrap();
        assert_eq!(record.rationale, "scene 2 is corrupt");
        assert_eq!(record.code, "scene.is_valid()");
    }

    /// Producers on several threads while the owner flushes every frame
    #[test]
    fn test_e2e_concurrent_producers_with_frame_flushes() {
        let clock = Arc::new(ManualFrameClock::new());
        let engine = Arc::new(CaptureEngine::new(&CaptureConfig::default(), clock.clone()));
        let fanout = Arc::new(FanoutSink::new(
            "root",
            vec![engine.clone() as Arc<dyn LogSink>],
        ));

        let (buffered, buffered_seen) = recorder("buffered");
        let (immediate, immediate_seen) = recorder("immediate");
        engine.register_buffered(&buffered);
        engine.register_immediate(&immediate);

        const PRODUCERS: usize = 4;
        const MESSAGES: usize = 500;

        let handles: Vec<_> = (0..PRODUCERS)
            .map(|p| {
                let fanout = fanout.clone();
                thread::spawn(move || {
                    for i in 0..MESSAGES {
                        log_info!(fanout, "{}:{}", p, i);
                    }
                })
            })
            .collect();

        let mut flushed = 0;
        while handles.iter().any(|h| !h.is_finished()) {
            clock.advance();
            flushed += engine.flush().events;
            thread::yield_now();
        }
        for handle in handles {
            handle.join().unwrap();
        }
        flushed += engine.flush().events;

        assert_eq!(flushed, PRODUCERS * MESSAGES);
        assert_eq!(immediate_seen.lock().unwrap().len(), PRODUCERS * MESSAGES);

        let seen = texts(&buffered_seen);
        assert_eq!(seen.len(), PRODUCERS * MESSAGES);
        for p in 0..PRODUCERS {
            let prefix = format!("{p}:");
            let order: Vec<usize> = seen
                .iter()
                .filter_map(|t| t.strip_prefix(prefix.as_str()))
                .map(|i| i.parse().unwrap())
                .collect();
            assert_eq!(order, (0..MESSAGES).collect::<Vec<_>>());
        }

        // frame stamps never go backwards within one producer's stream
        let events = buffered_seen.lock().unwrap();
        let frames: Vec<u64> = events
            .iter()
            .filter(|e| e.text.starts_with("0:"))
            .filter_map(|e| e.frame)
            .collect();
        assert!(frames.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(engine.stats().dropped, 0);
    }

    /// A subscriber logging through the fan-out that feeds the engine
    #[test]
    fn test_e2e_reentrant_subscriber_logs_through_fanout() {
        let engine = Arc::new(CaptureEngine::new(
            &CaptureConfig::default(),
            Arc::new(NoFrameClock),
        ));
        let fanout = Arc::new(FanoutSink::new(
            "root",
            vec![engine.clone() as Arc<dyn LogSink>],
        ));

        let weak: Weak<FanoutSink> = Arc::downgrade(&fanout);
        let auditor = Subscriber::new("auditor", move |event: &LogEvent| {
            if event.is_error() {
                if let Some(fanout) = weak.upgrade() {
                    log_info!(fanout, "audit: {}", event.text);
                }
            }
            Ok(())
        });
        let (tail, tail_seen) = recorder("tail");

        engine.register_buffered(&auditor);
        engine.register_buffered(&tail);
        engine.register_immediate(&auditor);

        log_error!(fanout, ErrorType::Warning, "disk.free() > 1GiB", "");

        // immediate pass already logged one audit line into the buffer
        assert_eq!(engine.pending_events(), 2);

        engine.flush();
        // the buffered pass logs a second audit line, kept for the next flush
        assert_eq!(
            texts(&tail_seen),
            vec!["disk.free() > 1GiB", "audit: disk.free() > 1GiB"]
        );
        assert_eq!(engine.pending_events(), 1);

        engine.flush();
        assert_eq!(tail_seen.lock().unwrap().len(), 3);
        assert_eq!(engine.pending_events(), 0);
    }

    /// A subscriber that registers a newcomer from inside its callback
    #[test]
    fn test_e2e_registration_from_callback() {
        let engine = Arc::new(CaptureEngine::new(
            &CaptureConfig::default(),
            Arc::new(NoFrameClock),
        ));
        let (late, late_seen) = recorder("late");

        let engine_ref = Arc::downgrade(&engine);
        let late_ref = late.clone();
        let added = Arc::new(Mutex::new(false));
        let added_ref = added.clone();
        let greeter = Subscriber::new("greeter", move |_: &LogEvent| {
            let mut added = added_ref.lock().unwrap();
            if !*added {
                if let Some(engine) = engine_ref.upgrade() {
                    engine.register_immediate(&late_ref);
                }
                *added = true;
            }
            Ok(())
        });

        engine.register_immediate(&greeter);
        assert_eq!(engine.mode(), CaptureMode::Passthrough);

        engine.write("first", false);
        engine.write("second", false);

        assert_eq!(texts(&late_seen), vec!["second"]);
        assert_eq!(engine.immediate_count(), 2);
    }

    /// A degraded file sink must not stop delivery to later children
    #[test]
    fn test_e2e_degraded_file_sink_isolated() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "file in the way").unwrap();

        let broken = Arc::new(RotatingFileSink::new(
            "broken",
            RotatingFileParams {
                base_path: blocker.join("app.log"),
                max_files: 2,
            },
        ));
        assert!(broken.is_degraded());

        let engine = Arc::new(CaptureEngine::new(
            &CaptureConfig::default(),
            Arc::new(NoFrameClock),
        ));
        let (console, console_seen) = recorder("console");
        engine.register_immediate(&console);

        let fanout = FanoutSink::new(
            "root",
            vec![
                broken.clone() as Arc<dyn LogSink>,
                engine.clone() as Arc<dyn LogSink>,
            ],
        );
        fanout.write("still delivered\n", true);

        let seen = console_seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].text, "still delivered\n");
        assert!(seen[0].is_error());
        assert_eq!(broken.metrics().snapshot().dropped_count, 1);
    }

    /// Retention keeps the newest backups across restarts
    #[test]
    fn test_e2e_rotation_across_restarts() {
        let dir = tempdir().unwrap();
        let base_path = dir.path().join("game.log");

        for run in 0..5 {
            let sink = RotatingFileSink::new(
                "file",
                RotatingFileParams {
                    base_path: base_path.clone(),
                    max_files: 3,
                },
            );
            log_info!(sink, "run {}\n", run);
            sink.flush_output();
        }

        let sink = RotatingFileSink::new(
            "file",
            RotatingFileParams {
                base_path: base_path.clone(),
                max_files: 3,
            },
        );
        let backups = sink.backups().unwrap();
        assert_eq!(backups.len(), 3);

        let contents: Vec<String> = backups
            .iter()
            .map(|p| fs::read_to_string(p).unwrap())
            .collect();
        assert_eq!(contents, vec!["run 2\n", "run 3\n", "run 4\n"]);
        assert_eq!(fs::read_to_string(&base_path).unwrap(), "");
    }
}
