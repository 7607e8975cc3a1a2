//! Sink error types and failure classification

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use beacon_common::ScheduleError;
use beacon_protocol::ProtocolError;

/// Errors that abort a disk write before the retry path is reached.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The batch could not be serialized; file state is untouched.
    #[error(transparent)]
    Serialization(#[from] ProtocolError),

    /// A new segment file could not be created. Terminal for this write;
    /// file creation is not retried.
    #[error("file creation failed at {path}: {source}")]
    FileCreation {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SinkError {
    /// Failure reason for metric tags.
    pub fn reason(&self) -> WriteFailureReason {
        match self {
            Self::Serialization(_) => WriteFailureReason::Serialization,
            Self::FileCreation { .. } => WriteFailureReason::FileCreation,
        }
    }
}

/// Broad classification of a write failure, used as a metric tag value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteFailureReason {
    /// Batch could not be encoded
    Serialization,
    /// Segment file could not be created
    FileCreation,
    /// Device or quota out of space
    DiskFull,
    /// Missing write permission
    PermissionDenied,
    /// Destination path is unusable
    CorruptPath,
    /// Other I/O failure
    Io,
}

impl WriteFailureReason {
    /// Stable tag value for metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Serialization => "serialization",
            Self::FileCreation => "file_creation_failed",
            Self::DiskFull => "disk_full",
            Self::PermissionDenied => "permission_denied",
            Self::CorruptPath => "corrupt_path",
            Self::Io => "io",
        }
    }

    /// Classify an I/O error.
    pub fn from_io(error: &io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::StorageFull | io::ErrorKind::QuotaExceeded => Self::DiskFull,
            io::ErrorKind::PermissionDenied | io::ErrorKind::ReadOnlyFilesystem => {
                Self::PermissionDenied
            }
            io::ErrorKind::NotFound | io::ErrorKind::InvalidInput => Self::CorruptPath,
            _ => Self::Io,
        }
    }
}

/// Whether a failed append cannot be expected to resolve by retrying.
///
/// Persistent failures need external intervention (freeing disk space,
/// fixing permissions, a valid destination path); retrying them only
/// delays escalation. Scheduler runtime failures count as transient: a
/// rejected or panicked task may well succeed on a fresh one.
pub fn is_persistent(error: &ScheduleError) -> bool {
    match error.as_io() {
        Some(io_err) => matches!(
            io_err.kind(),
            io::ErrorKind::PermissionDenied
                | io::ErrorKind::ReadOnlyFilesystem
                | io::ErrorKind::StorageFull
                | io::ErrorKind::QuotaExceeded
                | io::ErrorKind::NotFound
                | io::ErrorKind::InvalidInput
        ),
        None => false,
    }
}
