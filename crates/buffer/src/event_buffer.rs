//! Event buffer with periodic flushing
//!
//! Wraps one [`RingBuffer`] of events and a persistence sink. Producers
//! call [`EventBuffer::add`] from any task; it never performs I/O and
//! never fails. Flushing atomically drains the ring and hands the batch
//! to the sink; a flush of an empty buffer does not touch the sink.
//!
//! At most one periodic flush loop is active per buffer. Restarting the
//! loop bumps a generation counter; a superseded loop compares its own
//! generation against the current one after every wake-up, so a stale
//! tick that is already in flight becomes a no-op.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use beacon_common::EventPersisting;
use beacon_protocol::Event;

use crate::{DropPolicy, RingBuffer};

struct FlushLoop {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Bounded buffer feeding a persistence sink.
pub struct EventBuffer {
    ring: Arc<RingBuffer<Event>>,
    writer: Arc<dyn EventPersisting>,

    /// Generation of the currently active periodic loop
    generation: Arc<AtomicU64>,

    /// Active periodic loop, if any
    flush_loop: Mutex<Option<FlushLoop>>,
}

impl EventBuffer {
    /// Create a buffer with the given capacity and drop policy, feeding
    /// the given sink.
    pub fn new(capacity: usize, policy: DropPolicy, writer: Arc<dyn EventPersisting>) -> Self {
        Self {
            ring: Arc::new(RingBuffer::new(capacity, policy)),
            writer,
            generation: Arc::new(AtomicU64::new(0)),
            flush_loop: Mutex::new(None),
        }
    }

    /// Buffer an event. Non-blocking; never fails.
    ///
    /// Under overload the drop policy decides which event is discarded;
    /// discards are counted, never silent.
    pub fn add(&self, event: Event) {
        if !self.ring.push(event) {
            tracing::trace!("event rejected, buffer full");
        }
    }

    /// Drain the buffer and hand the batch to the sink.
    ///
    /// A flush of an empty buffer is a no-op: the sink is not called.
    pub async fn flush(&self) {
        drain_into(&self.ring, self.writer.as_ref()).await;
    }

    /// Start a periodic flush loop, replacing any active one.
    ///
    /// The superseded loop is cancelled; even a tick of it that is
    /// already past its sleep observes the generation change and exits
    /// without flushing.
    pub fn start_periodic_flush(&self, interval: Duration) {
        let mut guard = self.flush_loop.lock();

        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        if let Some(prev) = guard.take() {
            prev.cancel.cancel();
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_flush_loop(
            Arc::clone(&self.ring),
            Arc::clone(&self.writer),
            interval,
            cancel.clone(),
            generation,
            Arc::clone(&self.generation),
        ));

        tracing::debug!(interval_ms = interval.as_millis() as u64, "periodic flush started");
        *guard = Some(FlushLoop { cancel, handle });
    }

    /// Stop the periodic flush loop and wait for its in-flight iteration
    /// to finish. Safe to call when no loop is active, and repeatedly.
    pub async fn stop_flush(&self) {
        let taken = self.flush_loop.lock().take();

        if let Some(flush_loop) = taken {
            flush_loop.cancel.cancel();
            let _ = flush_loop.handle.await;
            tracing::debug!("periodic flush stopped");
        }
    }

    /// The ring capacity.
    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    /// Events currently buffered.
    pub fn len(&self) -> usize {
        self.ring.len()
    }

    /// Whether the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    /// Events discarded since construction.
    pub fn dropped_count(&self) -> u64 {
        self.ring.dropped_count()
    }
}

async fn drain_into(ring: &RingBuffer<Event>, writer: &dyn EventPersisting) {
    let events = ring.drain();
    if events.is_empty() {
        return;
    }

    tracing::debug!(count = events.len(), "flushing buffered events");
    writer.write(events).await;
}

async fn run_flush_loop(
    ring: Arc<RingBuffer<Event>>,
    writer: Arc<dyn EventPersisting>,
    interval: Duration,
    cancel: CancellationToken,
    generation: u64,
    current_generation: Arc<AtomicU64>,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }

        // A newer loop may have replaced this one while it slept.
        if current_generation.load(Ordering::Acquire) != generation {
            break;
        }

        drain_into(&ring, writer.as_ref()).await;

        if cancel.is_cancelled() {
            break;
        }
    }
}

#[cfg(test)]
#[path = "event_buffer_test.rs"]
mod event_buffer_test;
