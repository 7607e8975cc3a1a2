//! Beacon - Sinks
//!
//! Persistence layer of the Beacon telemetry pipeline: serialized event
//! batches land in rotating on-disk segment files, failed appends are
//! retried with backoff, and disk usage is kept under quota.
//!
//! # Architecture
//!
//! ```text
//! [EventBuffer] --write--> [FileDiskWriter] --enqueue--> [RetryCoordinator]
//!                               |                              |
//!                        [RotationPolicy]               [FileSystem::append]
//!                               |
//!                        [CleanupManager]
//! ```
//!
//! The disk writer serializes each batch, rolls the current file when a
//! size or event-count threshold would be breached, and hands the payload
//! to the retry coordinator for the durable append. Cleanup runs after
//! every successful handoff so disk pressure is re-evaluated continuously.
//!
//! # Available Sinks
//!
//! | Sink | Purpose |
//! |------|---------|
//! | [`FileDiskWriter`] | Rotating on-disk segments with retry |
//! | [`MemorySink`] | In-memory capture for tests and embedding |

mod cleanup;
mod error;
mod memory;
mod retry;

/// Disk writer, rotation policy, naming strategy, configuration
pub mod disk;

pub use cleanup::{CleanupErrorHook, CleanupManager};
pub use disk::{CurrentFile, DiskWriterConfig, FileDiskWriter, FileNamingStrategy, RotationPolicy};
pub use error::{is_persistent, SinkError, WriteFailureReason};
pub use memory::MemorySink;
pub use retry::{PendingWrite, PendingWriteStore, RetryCoordinator};
