//! Pending event buffer
//!
//! Append-only between flushes. A flush swaps the whole vector out so the
//! engine lock is held only for the swap.

use std::mem;

use contracts::LogEvent;

#[derive(Debug, Default)]
pub(crate) struct EventBuffer {
    events: Vec<LogEvent>,
}

impl EventBuffer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn push(&mut self, event: LogEvent) {
        self.events.push(event);
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.events.len()
    }

    pub(crate) fn get(&self, index: usize) -> Option<&LogEvent> {
        self.events.get(index)
    }

    /// Swap the contents out, leaving the buffer empty
    pub(crate) fn take(&mut self) -> Vec<LogEvent> {
        mem::take(&mut self.events)
    }

    /// Discard everything, returning how many events were dropped
    pub(crate) fn clear(&mut self) -> usize {
        let dropped = self.events.len();
        self.events.clear();
        dropped
    }
}
