//! Disk writer configuration

use std::fmt;
use std::time::Duration;

use super::naming::{default_naming_strategy, FileNamingStrategy};

/// Configuration for the disk writer and its cleanup/retry collaborators.
#[derive(Clone)]
pub struct DiskWriterConfig {
    /// Maximum file size in bytes before rotation
    pub max_file_size: usize,

    /// Maximum events per file before rotation
    pub max_events_per_file: usize,

    /// Ceiling on total bytes held across all segment files
    pub max_total_disk_usage: u64,

    /// How long segment files are kept before expiry
    pub retention: Duration,

    /// Append attempts before a write is abandoned
    pub max_attempts: u32,

    /// Base delay for exponential retry backoff
    pub base_delay: Duration,

    /// Segment file naming strategy
    pub naming: FileNamingStrategy,
}

impl Default for DiskWriterConfig {
    fn default() -> Self {
        Self {
            max_file_size: 1_000_000,                       // 1 MB per file
            max_events_per_file: 1000,
            max_total_disk_usage: 10_000_000,               // 10 MB across files
            retention: Duration::from_secs(7 * 24 * 3600),  // 7 days
            max_attempts: 5,
            base_delay: Duration::from_millis(500),
            naming: default_naming_strategy(),
        }
    }
}

impl DiskWriterConfig {
    /// Config with a custom per-file size ceiling.
    pub fn with_max_file_size(mut self, bytes: usize) -> Self {
        self.max_file_size = bytes;
        self
    }

    /// Config with a custom per-file event ceiling.
    pub fn with_max_events_per_file(mut self, events: usize) -> Self {
        self.max_events_per_file = events;
        self
    }

    /// Config with a custom total-disk-usage ceiling.
    pub fn with_max_total_disk_usage(mut self, bytes: u64) -> Self {
        self.max_total_disk_usage = bytes;
        self
    }

    /// Config with a custom retention duration.
    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    /// Config with a custom retry attempt ceiling.
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Config with a custom backoff base delay.
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Config with a custom naming strategy.
    pub fn with_naming(mut self, naming: FileNamingStrategy) -> Self {
        self.naming = naming;
        self
    }
}

impl fmt::Debug for DiskWriterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiskWriterConfig")
            .field("max_file_size", &self.max_file_size)
            .field("max_events_per_file", &self.max_events_per_file)
            .field("max_total_disk_usage", &self.max_total_disk_usage)
            .field("retention", &self.retention)
            .field("max_attempts", &self.max_attempts)
            .field("base_delay", &self.base_delay)
            .finish_non_exhaustive()
    }
}
