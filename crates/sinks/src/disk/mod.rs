//! Disk writer - rotating on-disk event segments
//!
//! Persists serialized event batches into segment files in a single
//! managed directory, rolling to a new file whenever a size or
//! event-count ceiling would be breached.
//!
//! # Write Path
//!
//! 1. Serialize the batch. A serializer failure aborts the write with a
//!    failure metric; file state is untouched.
//! 2. Consult the rotation policy. If the batch would overflow the
//!    current file (or no file exists), create a new segment via the
//!    naming strategy. Creation failure is terminal for this write and
//!    is not retried.
//! 3. Hand payload and destination to the retry coordinator for the
//!    durable append.
//! 4. On successful handoff, bump the file's running counters and emit
//!    a success metric.
//! 5. Run a cleanup pass so disk pressure is re-evaluated after every
//!    write.
//!
//! # Example
//!
//! ```ignore
//! let retry = RetryCoordinator::new(fs.clone(), scheduler, metrics.clone(), 5, base_delay);
//! let cleanup = CleanupManager::new(dir.clone(), fs.clone(), retention, quota);
//! let writer = FileDiskWriter::new(dir, serializer, fs, retry, cleanup, metrics, &config);
//!
//! writer.write(events).await; // via the EventPersisting trait
//! ```

mod config;
mod naming;
mod rotation;

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use tokio::sync::Mutex;

use beacon_common::{names, EventPersisting, FileSystem, MetricsEmitter};
use beacon_protocol::{Event, EventSerializer};

use crate::error::SinkError;
use crate::{CleanupManager, PendingWrite, RetryCoordinator};

pub use config::DiskWriterConfig;
pub use naming::{default_file_name, default_naming_strategy, FileNamingStrategy};
pub use rotation::RotationPolicy;

/// The segment file currently receiving appends.
///
/// Replaced wholesale on rotation; a rotated-out instance is never
/// reopened for append.
#[derive(Debug, Clone)]
pub struct CurrentFile {
    /// Segment path
    pub path: PathBuf,

    /// Events handed off to this file so far
    pub event_count: usize,

    /// Bytes handed off to this file so far
    pub size_bytes: usize,
}

/// Writes event batches to rotating segment files.
///
/// The single consumer of the event buffer; producers never touch this
/// type directly.
pub struct FileDiskWriter {
    directory: PathBuf,
    serializer: Arc<dyn EventSerializer>,
    retry: RetryCoordinator,
    cleanup: CleanupManager,
    metrics: Arc<dyn MetricsEmitter>,
    rotation: RotationPolicy,
    naming: FileNamingStrategy,
    fs: Arc<dyn FileSystem>,

    /// Current segment; mutations serialize through this lock.
    current: Mutex<Option<CurrentFile>>,
}

impl FileDiskWriter {
    /// Create a writer persisting into `directory`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        directory: PathBuf,
        serializer: Arc<dyn EventSerializer>,
        fs: Arc<dyn FileSystem>,
        retry: RetryCoordinator,
        cleanup: CleanupManager,
        metrics: Arc<dyn MetricsEmitter>,
        config: &DiskWriterConfig,
    ) -> Self {
        Self {
            directory,
            serializer,
            retry,
            cleanup,
            metrics,
            rotation: RotationPolicy::new(config.max_file_size, config.max_events_per_file),
            naming: Arc::clone(&config.naming),
            fs,
            current: Mutex::new(None),
        }
    }

    /// Snapshot of the current segment, for inspection.
    pub async fn current_file(&self) -> Option<CurrentFile> {
        self.current.lock().await.clone()
    }

    async fn try_write(&self, events: &[Event]) -> Result<(), SinkError> {
        let payload = self.serializer.encode(events)?;
        let payload_len = payload.len();

        let mut current = self.current.lock().await;

        let rotate = match current.as_ref() {
            None => true,
            Some(file) => self.rotation.should_rotate(
                file.size_bytes,
                file.event_count,
                payload_len,
                events.len(),
            ),
        };
        if rotate {
            let replacing = current.is_some();
            *current = Some(self.create_file()?);
            if replacing {
                self.metrics.emit(names::FILE_ROTATION, 1.0, &[]);
            }
        }

        if let Some(file) = current.as_mut() {
            self.retry
                .enqueue(PendingWrite::new(Bytes::from(payload), file.path.clone()));

            file.event_count += events.len();
            file.size_bytes += payload_len;
        }

        Ok(())
    }

    /// Create a fresh segment file via the naming strategy.
    fn create_file(&self) -> Result<CurrentFile, SinkError> {
        let name = (self.naming)(Utc::now());
        let path = self.directory.join(name);

        self.fs
            .write_atomic(&[], &path)
            .map_err(|source| SinkError::FileCreation {
                path: path.clone(),
                source,
            })?;

        tracing::debug!(path = %path.display(), "created segment file");
        Ok(CurrentFile {
            path,
            event_count: 0,
            size_bytes: 0,
        })
    }
}

#[async_trait]
impl EventPersisting for FileDiskWriter {
    async fn write(&self, events: Vec<Event>) {
        if events.is_empty() {
            return;
        }

        match self.try_write(&events).await {
            Ok(()) => {
                self.metrics
                    .emit(names::WRITE_SUCCESS, events.len() as f64, &[]);
                self.cleanup.perform_cleanup();
            }
            Err(e) => {
                self.metrics.emit(
                    names::WRITE_FAILURE,
                    1.0,
                    &[("error", e.reason().as_str().to_string())],
                );
                tracing::error!(error = %e, count = events.len(), "failed to write event batch");
            }
        }
    }
}
