//! In-memory sink
//!
//! Captures batches instead of persisting them. Useful as a test double
//! and for host embeddings that export through their own transport.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use beacon_common::EventPersisting;
use beacon_protocol::Event;

/// [`EventPersisting`] implementation that keeps events in memory.
#[derive(Default)]
pub struct MemorySink {
    events: Mutex<Vec<Event>>,
    writes: AtomicU64,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `write` calls received.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    /// Events captured so far.
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Whether no events were captured.
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Remove and return all captured events.
    pub fn take(&self) -> Vec<Event> {
        let mut events = self.events.lock();
        std::mem::take(&mut *events)
    }
}

#[async_trait]
impl EventPersisting for MemorySink {
    async fn write(&self, events: Vec<Event>) {
        self.writes.fetch_add(1, Ordering::Relaxed);
        self.events.lock().extend(events);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_captures_batches_in_order() {
        let sink = MemorySink::new();

        sink.write(vec![Event::new("a"), Event::new("b")]).await;
        sink.write(vec![Event::new("c")]).await;

        assert_eq!(sink.write_count(), 2);
        assert_eq!(sink.len(), 3);

        let names: Vec<String> = sink.take().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert!(sink.is_empty());
    }
}
