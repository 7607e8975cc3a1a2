//! Retry coordination for durable appends
//!
//! Owns a FIFO queue of pending writes and at most one drain task.
//! Entries are processed strictly in order; a stuck entry delays the
//! entries behind it rather than being reordered or parallelized.
//!
//! Each attempt runs the append through the injected [`Scheduler`]. A
//! transient failure backs off exponentially with jitter and retries the
//! same entry; a persistent failure, or reaching the attempt ceiling,
//! escalates to the critical-error handler exactly once and optionally
//! hands the entry to a durable store for crash recovery.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rand::Rng;

use beacon_common::{
    names, BlockingOp, CriticalErrorHandler, FileSystem, MetricsEmitter, ScheduleError, Scheduler,
};

use crate::error::is_persistent;

/// A serialized batch awaiting its durable append.
#[derive(Debug, Clone)]
pub struct PendingWrite {
    /// Serialized batch payload
    pub payload: Bytes,

    /// Destination segment file
    pub path: PathBuf,

    /// Append attempts made so far
    pub attempts: u32,

    /// When the write entered the retry path
    pub created_at: DateTime<Utc>,
}

impl PendingWrite {
    /// Create a fresh pending write with zero attempts.
    pub fn new(payload: Bytes, path: PathBuf) -> Self {
        Self {
            payload,
            path,
            attempts: 0,
            created_at: Utc::now(),
        }
    }
}

/// Optional durable store for writes that exhausted the retry path.
///
/// A host can persist abandoned writes and reconcile them on next launch;
/// without a store, terminally failed writes are dropped after escalation.
pub trait PendingWriteStore: Send + Sync {
    /// Persist a terminally failed write.
    fn persist(&self, write: &PendingWrite);
}

struct DrainState {
    queue: VecDeque<PendingWrite>,
    draining: bool,
}

struct Inner {
    fs: Arc<dyn FileSystem>,
    scheduler: Arc<dyn Scheduler>,
    metrics: Arc<dyn MetricsEmitter>,
    critical: Option<Arc<dyn CriticalErrorHandler>>,
    store: Option<Arc<dyn PendingWriteStore>>,
    max_attempts: u32,
    base_delay: Duration,
    state: Mutex<DrainState>,
}

/// FIFO retry queue with a single drain task.
#[derive(Clone)]
pub struct RetryCoordinator {
    inner: Arc<Inner>,
}

impl RetryCoordinator {
    /// Create a coordinator appending through `fs` via `scheduler`.
    pub fn new(
        fs: Arc<dyn FileSystem>,
        scheduler: Arc<dyn Scheduler>,
        metrics: Arc<dyn MetricsEmitter>,
        max_attempts: u32,
        base_delay: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                fs,
                scheduler,
                metrics,
                critical: None,
                store: None,
                max_attempts: max_attempts.max(1),
                base_delay,
                state: Mutex::new(DrainState {
                    queue: VecDeque::new(),
                    draining: false,
                }),
            }),
        }
    }

    /// Attach a critical-error handler for terminally failed writes.
    pub fn with_critical_handler(mut self, handler: Arc<dyn CriticalErrorHandler>) -> Self {
        let inner = Arc::get_mut(&mut self.inner)
            .expect("configure the coordinator before sharing it");
        inner.critical = Some(handler);
        self
    }

    /// Attach a durable store for terminally failed writes.
    pub fn with_store(mut self, store: Arc<dyn PendingWriteStore>) -> Self {
        let inner = Arc::get_mut(&mut self.inner)
            .expect("configure the coordinator before sharing it");
        inner.store = Some(store);
        self
    }

    /// Queue a write for durable append.
    ///
    /// Non-blocking; (re)starts the drain task if it is idle. Must be
    /// called from within a tokio runtime.
    pub fn enqueue(&self, write: PendingWrite) {
        let start_drain = {
            let mut state = self.inner.state.lock();
            state.queue.push_back(write);
            if state.draining {
                false
            } else {
                state.draining = true;
                true
            }
        };

        if start_drain {
            let inner = Arc::clone(&self.inner);
            tokio::spawn(async move {
                inner.drain().await;
            });
        }
    }

    /// Whether the queue is empty and no drain task is running.
    pub fn is_idle(&self) -> bool {
        let state = self.inner.state.lock();
        state.queue.is_empty() && !state.draining
    }

    /// Entries currently queued (excluding the one being retried).
    pub fn queued_len(&self) -> usize {
        self.inner.state.lock().queue.len()
    }
}

impl Inner {
    async fn drain(&self) {
        loop {
            let next = {
                let mut state = self.state.lock();
                match state.queue.pop_front() {
                    Some(write) => write,
                    None => {
                        state.draining = false;
                        return;
                    }
                }
            };

            self.retry_one(next).await;
        }
    }

    async fn retry_one(&self, mut write: PendingWrite) {
        loop {
            match self.attempt_append(&write).await {
                Ok(()) => {
                    self.metrics.emit(
                        names::RETRY_ATTEMPT,
                        1.0,
                        &[
                            ("status", "success".into()),
                            ("max_attempts", self.max_attempts.to_string()),
                        ],
                    );
                    return;
                }
                Err(error) => {
                    write.attempts += 1;
                    self.metrics.emit(
                        names::RETRY_ATTEMPT,
                        1.0,
                        &[
                            ("status", "failed".into()),
                            ("max_attempts", self.max_attempts.to_string()),
                        ],
                    );

                    if is_persistent(&error) {
                        self.abandon(write, &error, "persistent");
                        return;
                    }
                    if write.attempts >= self.max_attempts {
                        self.abandon(write, &error, "exhausted");
                        return;
                    }

                    let delay = backoff_delay(self.base_delay, write.attempts);
                    tracing::warn!(
                        path = %write.path.display(),
                        attempt = write.attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "append failed, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    async fn attempt_append(&self, write: &PendingWrite) -> Result<(), ScheduleError> {
        let fs = Arc::clone(&self.fs);
        let payload = write.payload.clone();
        let path = write.path.clone();
        let op: BlockingOp = Box::new(move || fs.append(&payload, &path));
        self.scheduler.schedule_blocking(op).await
    }

    fn abandon(&self, write: PendingWrite, error: &ScheduleError, reason: &str) {
        self.metrics.emit(
            names::RETRY_EXCEEDED,
            1.0,
            &[
                ("max_attempts", self.max_attempts.to_string()),
                ("reason", reason.to_string()),
            ],
        );
        tracing::error!(
            path = %write.path.display(),
            attempts = write.attempts,
            reason,
            error = %error,
            "write abandoned"
        );

        if let Some(handler) = &self.critical {
            handler.handle(error);
        }
        if let Some(store) = &self.store {
            store.persist(&write);
        }
    }
}

/// Exponential backoff with jitter: `base * 2^attempts` plus a random
/// addition in `[0, 20%]` of that delay, so synchronized retries from
/// multiple hosts do not storm the disk at the same instants.
fn backoff_delay(base: Duration, attempts: u32) -> Duration {
    let exp = base.as_secs_f64() * 2f64.powi(attempts.min(20) as i32);
    let jitter = rand::rng().random_range(0.0..=exp * 0.2);
    Duration::from_secs_f64(exp + jitter)
}

#[cfg(test)]
#[path = "retry_test.rs"]
mod retry_test;
