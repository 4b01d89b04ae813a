//! The flush toggle is process-wide, so it gets a test binary of its own.

use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use contracts::globals;
use dispatcher::{LogSink, StdoutSink};

#[derive(Clone, Default)]
struct FlushCounter(Arc<AtomicUsize>);

impl Write for FlushCounter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[test]
fn test_flush_follows_global_toggle() {
    let out = FlushCounter::default();
    let sink = StdoutSink::with_streams("console", Box::new(out.clone()), Box::new(io::sink()));

    sink.write("buffered\n", false);
    assert_eq!(out.0.load(Ordering::SeqCst), 0);

    globals::set_flush_stdout_on_print(true);
    sink.write("flushed\n", false);
    sink.write("flushed\n", false);
    assert_eq!(out.0.load(Ordering::SeqCst), 2);

    globals::set_flush_stdout_on_print(false);
    sink.write("buffered again\n", false);
    assert_eq!(out.0.load(Ordering::SeqCst), 2);
}
