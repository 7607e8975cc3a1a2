//! Flush scheduling
//!
//! Decides *when* the buffer flushes, decoupled from buffer internals:
//! on a recurring timer, on demand, and when the host lifecycle signals
//! imminent suspension. Each timer tick dispatches the flush through the
//! injected [`Scheduler`]; if the scheduler itself fails, the failure is
//! reported through the metrics path and the loop backs off for a fixed
//! cooldown instead of spinning.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use beacon_common::{names, LifecycleObserver, MetricsEmitter, Scheduler, TaskFuture};

use crate::EventBuffer;

/// Pause after a scheduler failure before the timer loop resumes.
pub const SCHEDULE_FAILURE_COOLDOWN: Duration = Duration::from_secs(1);

struct ControllerState {
    buffer: Option<Arc<EventBuffer>>,
    cancel: Option<CancellationToken>,
    handle: Option<JoinHandle<()>>,
}

/// Schedules flushes for one [`EventBuffer`].
pub struct FlushController {
    interval: Duration,
    cooldown: Duration,
    scheduler: Arc<dyn Scheduler>,
    lifecycle: Arc<dyn LifecycleObserver>,
    metrics: Arc<dyn MetricsEmitter>,
    state: Mutex<ControllerState>,
}

impl FlushController {
    /// Create a controller flushing every `interval`.
    pub fn new(
        interval: Duration,
        scheduler: Arc<dyn Scheduler>,
        lifecycle: Arc<dyn LifecycleObserver>,
        metrics: Arc<dyn MetricsEmitter>,
    ) -> Self {
        Self {
            interval,
            cooldown: SCHEDULE_FAILURE_COOLDOWN,
            scheduler,
            lifecycle,
            metrics,
            state: Mutex::new(ControllerState {
                buffer: None,
                cancel: None,
                handle: None,
            }),
        }
    }

    /// Override the scheduler-failure cooldown.
    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Start scheduling flushes for `buffer`, replacing any previous loop.
    ///
    /// Also registers a lifecycle hook so an imminent host suspension
    /// forces a flush. Must be called from within a tokio runtime.
    pub fn start(&self, buffer: Arc<EventBuffer>) {
        let mut state = self.state.lock();

        if let Some(prev) = state.cancel.take() {
            prev.cancel();
        }

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run_timer_loop(
            Arc::clone(&buffer),
            Arc::clone(&self.scheduler),
            Arc::clone(&self.metrics),
            self.interval,
            self.cooldown,
            cancel.clone(),
        ));

        // Flush when the host is about to suspend. The hook runs on the
        // host's signalling thread; the flush itself runs on the runtime.
        // Hooks from superseded starts observe their cancelled token and
        // do nothing.
        let runtime = tokio::runtime::Handle::current();
        let hook_buffer = Arc::clone(&buffer);
        let hook_cancel = cancel.clone();
        self.lifecycle.observe_suspend(Box::new(move || {
            if hook_cancel.is_cancelled() {
                return;
            }
            let buffer = Arc::clone(&hook_buffer);
            runtime.spawn(async move {
                tracing::debug!("host suspending, forcing flush");
                buffer.flush().await;
            });
        }));

        state.buffer = Some(buffer);
        state.cancel = Some(cancel);
        state.handle = Some(handle);

        tracing::debug!(interval_ms = self.interval.as_millis() as u64, "flush controller started");
    }

    /// Flush on demand. No-op if [`start`](Self::start) was never called.
    pub async fn flush(&self) {
        let buffer = self.state.lock().buffer.clone();
        if let Some(buffer) = buffer {
            buffer.flush().await;
        }
    }

    /// Cancel the scheduling loop. Safe to call repeatedly.
    pub fn stop(&self) {
        let mut state = self.state.lock();
        if let Some(cancel) = state.cancel.take() {
            cancel.cancel();
            tracing::debug!("flush controller stopped");
        }
        state.handle = None;
    }
}

async fn run_timer_loop(
    buffer: Arc<EventBuffer>,
    scheduler: Arc<dyn Scheduler>,
    metrics: Arc<dyn MetricsEmitter>,
    interval: Duration,
    cooldown: Duration,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
        if cancel.is_cancelled() {
            break;
        }

        let tick_buffer = Arc::clone(&buffer);
        let flush: TaskFuture = Box::pin(async move {
            tick_buffer.flush().await;
        });

        if let Err(e) = scheduler.schedule(flush).await {
            metrics.emit(
                names::FLUSH_SCHEDULE_FAILURE,
                1.0,
                &[("error", e.to_string())],
            );
            tracing::warn!(error = %e, "flush dispatch failed, backing off");

            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(cooldown) => {}
            }
        }
    }
}

#[cfg(test)]
#[path = "flush_controller_test.rs"]
mod flush_controller_test;
