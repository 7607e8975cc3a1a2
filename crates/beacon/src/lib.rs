//! Beacon - client-side telemetry event pipeline
//!
//! Events are buffered in a bounded ring, flushed on a timer (or on
//! demand, or when the host signals suspension), serialized, written to
//! rotating on-disk segment files, retried on transient failure, and
//! garbage-collected under disk-quota pressure. The pipeline never
//! blocks the caller: [`Beacon::track`] is a short critical section
//! with no I/O, and every failure terminates in a metric or the
//! critical-error path rather than in the producer.
//!
//! # Example
//!
//! ```ignore
//! use beacon::{Beacon, BeaconConfig, Event};
//!
//! let config = BeaconConfig {
//!     directory: "/var/lib/myapp/telemetry".into(),
//!     ..Default::default()
//! };
//! let pipeline = Beacon::builder(config).build();
//! pipeline.start();
//!
//! pipeline.track(Event::new("app.launch").with_attribute("cold_start", true));
//!
//! // On shutdown: stop the timers and push out what is buffered.
//! pipeline.shutdown().await;
//! ```
//!
//! # Durability
//!
//! Only flushed-and-appended bytes are durable. Events still in the ring
//! when the process dies are lost (bounded by the ring capacity); writes
//! still in the retry queue are recoverable only through a configured
//! [`PendingWriteStore`].

mod config;

use std::sync::Arc;

use beacon_buffer::{EventBuffer, FlushController};
use beacon_sinks::{CleanupManager, FileDiskWriter, RetryCoordinator};

pub use beacon_buffer::DropPolicy;
pub use beacon_common::{
    CriticalErrorHandler, EventPersisting, FileSystem, LifecycleObserver, MetricsEmitter,
    NoopLifecycle, NoopMetrics, Scheduler, StdFileSystem, SuspendNotifier, TokioScheduler,
};
pub use beacon_protocol::{
    AttributeValue, Event, EventId, EventSerializer, JsonSerializer, Lz4JsonSerializer,
};
pub use beacon_sinks::{MemorySink, PendingWriteStore};
pub use config::{BeaconConfig, DropPolicyConfig};

/// Builder wiring the pipeline's collaborators.
///
/// Every collaborator has a production default; tests and embedders
/// override the ones they care about.
pub struct BeaconBuilder {
    config: BeaconConfig,
    serializer: Option<Arc<dyn EventSerializer>>,
    fs: Option<Arc<dyn FileSystem>>,
    scheduler: Option<Arc<dyn Scheduler>>,
    metrics: Option<Arc<dyn MetricsEmitter>>,
    lifecycle: Option<Arc<dyn LifecycleObserver>>,
    critical: Option<Arc<dyn CriticalErrorHandler>>,
    store: Option<Arc<dyn PendingWriteStore>>,
}

impl BeaconBuilder {
    fn new(config: BeaconConfig) -> Self {
        Self {
            config,
            serializer: None,
            fs: None,
            scheduler: None,
            metrics: None,
            lifecycle: None,
            critical: None,
            store: None,
        }
    }

    /// Override the batch serializer.
    pub fn serializer(mut self, serializer: Arc<dyn EventSerializer>) -> Self {
        self.serializer = Some(serializer);
        self
    }

    /// Override the filesystem.
    pub fn file_system(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = Some(fs);
        self
    }

    /// Override the scheduler.
    pub fn scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Wire a metrics backend.
    pub fn metrics(mut self, metrics: Arc<dyn MetricsEmitter>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Wire the host lifecycle source.
    pub fn lifecycle(mut self, lifecycle: Arc<dyn LifecycleObserver>) -> Self {
        self.lifecycle = Some(lifecycle);
        self
    }

    /// Wire a critical-error handler.
    pub fn critical_handler(mut self, handler: Arc<dyn CriticalErrorHandler>) -> Self {
        self.critical = Some(handler);
        self
    }

    /// Wire a durable store for terminally failed writes.
    pub fn pending_write_store(mut self, store: Arc<dyn PendingWriteStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Assemble the pipeline.
    pub fn build(self) -> Beacon {
        let serializer = self.serializer.unwrap_or_else(|| {
            if self.config.compression {
                Arc::new(Lz4JsonSerializer::new())
            } else {
                Arc::new(JsonSerializer::new())
            }
        });
        let fs = self.fs.unwrap_or_else(|| Arc::new(StdFileSystem::new()));
        let scheduler = self
            .scheduler
            .unwrap_or_else(|| Arc::new(TokioScheduler::new()));
        let metrics = self.metrics.unwrap_or_else(|| Arc::new(NoopMetrics::new()));
        let lifecycle = self
            .lifecycle
            .unwrap_or_else(|| Arc::new(NoopLifecycle::new()));

        let disk_config = self.config.disk_config();
        let directory = self.config.directory.clone();

        let mut retry = RetryCoordinator::new(
            Arc::clone(&fs),
            Arc::clone(&scheduler),
            Arc::clone(&metrics),
            disk_config.max_attempts,
            disk_config.base_delay,
        );
        if let Some(handler) = self.critical {
            retry = retry.with_critical_handler(handler);
        }
        if let Some(store) = self.store {
            retry = retry.with_store(store);
        }

        let cleanup = CleanupManager::new(
            directory.clone(),
            Arc::clone(&fs),
            disk_config.retention,
            disk_config.max_total_disk_usage,
        );
        let writer = Arc::new(FileDiskWriter::new(
            directory,
            serializer,
            fs,
            retry,
            cleanup,
            Arc::clone(&metrics),
            &disk_config,
        ));

        let buffer = Arc::new(EventBuffer::new(
            self.config.capacity,
            self.config.drop_policy.into(),
            writer,
        ));
        let controller = FlushController::new(
            self.config.flush_interval(),
            scheduler,
            lifecycle,
            metrics,
        );

        Beacon { buffer, controller }
    }
}

/// The wired telemetry pipeline.
pub struct Beacon {
    buffer: Arc<EventBuffer>,
    controller: FlushController,
}

impl Beacon {
    /// Start building a pipeline from a configuration.
    pub fn builder(config: BeaconConfig) -> BeaconBuilder {
        BeaconBuilder::new(config)
    }

    /// Start the periodic flush schedule and lifecycle hook.
    ///
    /// Must be called from within a tokio runtime. Idempotent in effect:
    /// a repeated call replaces the running schedule.
    pub fn start(&self) {
        self.controller.start(Arc::clone(&self.buffer));
        tracing::info!("telemetry pipeline started");
    }

    /// Record an event. Non-blocking; never fails.
    pub fn track(&self, event: Event) {
        self.buffer.add(event);
    }

    /// Flush buffered events now.
    pub async fn flush(&self) {
        self.buffer.flush().await;
    }

    /// Stop the schedule and push out everything still buffered.
    pub async fn shutdown(&self) {
        self.controller.stop();
        self.buffer.stop_flush().await;
        self.buffer.flush().await;
        tracing::info!(dropped = self.buffer.dropped_count(), "telemetry pipeline stopped");
    }

    /// Events discarded under overload since construction.
    pub fn dropped_count(&self) -> u64 {
        self.buffer.dropped_count()
    }

    /// Events currently buffered.
    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod lib_test;
