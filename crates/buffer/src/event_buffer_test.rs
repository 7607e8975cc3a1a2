//! Tests for the event buffer

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use beacon_common::EventPersisting;
use beacon_protocol::Event;

use super::EventBuffer;
use crate::DropPolicy;

// ============================================================================
// Test Helpers
// ============================================================================

/// Sink recording every batch it receives.
#[derive(Default)]
struct RecordingSink {
    writes: Mutex<Vec<Vec<Event>>>,
}

impl RecordingSink {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn write_count(&self) -> usize {
        self.writes.lock().len()
    }

    fn batches(&self) -> Vec<Vec<Event>> {
        self.writes.lock().clone()
    }
}

#[async_trait]
impl EventPersisting for RecordingSink {
    async fn write(&self, events: Vec<Event>) {
        self.writes.lock().push(events);
    }
}

/// Sink whose write takes a while, for in-flight shutdown tests.
struct SlowSink {
    started: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
}

#[async_trait]
impl EventPersisting for SlowSink {
    async fn write(&self, _events: Vec<Event>) {
        self.started.store(true, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;
        self.finished.store(true, Ordering::SeqCst);
    }
}

fn event(name: &str) -> Event {
    Event::new(name)
}

// ============================================================================
// Add / Flush
// ============================================================================

#[tokio::test]
async fn test_flush_empty_buffer_never_calls_sink() {
    let sink = RecordingSink::new();
    let buffer = EventBuffer::new(10, DropPolicy::DropOldest, sink.clone());

    buffer.flush().await;
    buffer.flush().await;

    assert_eq!(sink.write_count(), 0);
}

#[tokio::test]
async fn test_flush_hands_batch_in_order() {
    let sink = RecordingSink::new();
    let buffer = EventBuffer::new(10, DropPolicy::DropOldest, sink.clone());

    buffer.add(event("first"));
    buffer.add(event("second"));
    buffer.add(event("third"));
    buffer.flush().await;

    let batches = sink.batches();
    assert_eq!(batches.len(), 1);
    let names: Vec<&str> = batches[0].iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["first", "second", "third"]);
    assert!(buffer.is_empty());
}

#[tokio::test]
async fn test_second_flush_is_noop() {
    let sink = RecordingSink::new();
    let buffer = EventBuffer::new(10, DropPolicy::DropOldest, sink.clone());

    buffer.add(event("only"));
    buffer.flush().await;
    buffer.flush().await;

    assert_eq!(sink.write_count(), 1);
}

#[tokio::test]
async fn test_overload_is_bounded_and_counted() {
    let sink = RecordingSink::new();
    let buffer = EventBuffer::new(3, DropPolicy::DropNewest, sink.clone());

    for i in 0..10 {
        buffer.add(event(&format!("e{i}")));
    }

    assert_eq!(buffer.len(), 3);
    assert_eq!(buffer.dropped_count(), 7);
}

// ============================================================================
// Concurrent Producers
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_thousand_concurrent_adds_one_flush() {
    let capacity = 100;
    let total = 1000;
    let sink = RecordingSink::new();
    let buffer = Arc::new(EventBuffer::new(capacity, DropPolicy::DropOldest, sink.clone()));

    let handles: Vec<_> = (0..total)
        .map(|i| {
            let buffer = Arc::clone(&buffer);
            tokio::spawn(async move {
                buffer.add(event(&format!("e{i}")));
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    buffer.flush().await;

    // Exactly one sink invocation with exactly `capacity` events, all of
    // which were among the submitted ones.
    let batches = sink.batches();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].len(), capacity);
    for flushed in &batches[0] {
        assert!(flushed.name.starts_with('e'));
    }
    assert_eq!(buffer.dropped_count(), (total - capacity) as u64);
}

// ============================================================================
// Periodic Flush
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_periodic_flush_ticks() {
    let sink = RecordingSink::new();
    let buffer = EventBuffer::new(10, DropPolicy::DropOldest, sink.clone());

    buffer.add(event("a"));
    buffer.start_periodic_flush(Duration::from_millis(100));

    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(sink.write_count(), 1);

    buffer.add(event("b"));
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(sink.write_count(), 2);

    buffer.stop_flush().await;
}

#[tokio::test(start_paused = true)]
async fn test_empty_ticks_do_not_call_sink() {
    let sink = RecordingSink::new();
    let buffer = EventBuffer::new(10, DropPolicy::DropOldest, sink.clone());

    buffer.start_periodic_flush(Duration::from_millis(10));
    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(sink.write_count(), 0);
    buffer.stop_flush().await;
}

#[tokio::test(start_paused = true)]
async fn test_restart_supersedes_previous_loop() {
    let sink = RecordingSink::new();
    let buffer = EventBuffer::new(10, DropPolicy::DropOldest, sink.clone());

    buffer.add(event("held"));

    // The first loop would tick at 100ms; the replacement loop practically
    // never ticks. If the superseded loop's tick still ran, the event
    // would be flushed.
    buffer.start_periodic_flush(Duration::from_millis(100));
    buffer.start_periodic_flush(Duration::from_secs(100_000));

    tokio::time::sleep(Duration::from_millis(500)).await;

    assert_eq!(sink.write_count(), 0);
    assert_eq!(buffer.len(), 1);

    buffer.stop_flush().await;
}

#[tokio::test(start_paused = true)]
async fn test_stop_flush_waits_for_inflight_write() {
    let started = Arc::new(AtomicBool::new(false));
    let finished = Arc::new(AtomicBool::new(false));
    let sink = Arc::new(SlowSink {
        started: Arc::clone(&started),
        finished: Arc::clone(&finished),
    });
    let buffer = EventBuffer::new(10, DropPolicy::DropOldest, sink);

    buffer.add(event("slow"));
    buffer.start_periodic_flush(Duration::from_millis(10));

    // Let the tick fire and enter the slow write.
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(started.load(Ordering::SeqCst));

    buffer.stop_flush().await;
    assert!(finished.load(Ordering::SeqCst), "stop must wait out the in-flight write");
}

#[tokio::test]
async fn test_stop_flush_is_idempotent() {
    let sink = RecordingSink::new();
    let buffer = EventBuffer::new(10, DropPolicy::DropOldest, sink.clone());

    // No loop active: safe no-op.
    buffer.stop_flush().await;

    buffer.start_periodic_flush(Duration::from_millis(10));
    buffer.stop_flush().await;
    buffer.stop_flush().await;
}
