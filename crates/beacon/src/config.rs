//! Pipeline configuration
//!
//! Deserializable from the host's config format (TOML, JSON, ...) or
//! built in code; every field has a production-sensible default.
//!
//! # Example
//!
//! ```toml
//! [telemetry]
//! directory = "/var/lib/myapp/telemetry"
//! capacity = 500
//! drop_policy = "drop_newest"
//! flush_interval_secs = 10
//! compression = true
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use beacon_buffer::DropPolicy;
use beacon_sinks::DiskWriterConfig;

/// Drop policy as it appears in host configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropPolicyConfig {
    /// Evict the oldest buffered event under overload
    #[default]
    DropOldest,
    /// Reject incoming events under overload
    DropNewest,
}

impl From<DropPolicyConfig> for DropPolicy {
    fn from(value: DropPolicyConfig) -> Self {
        match value {
            DropPolicyConfig::DropOldest => DropPolicy::DropOldest,
            DropPolicyConfig::DropNewest => DropPolicy::DropNewest,
        }
    }
}

/// Top-level configuration for a [`Beacon`](crate::Beacon) pipeline.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BeaconConfig {
    /// Directory holding event segment files
    pub directory: PathBuf,

    /// Ring buffer capacity (bounds events awaiting flush)
    pub capacity: usize,

    /// What to discard when the buffer is full
    pub drop_policy: DropPolicyConfig,

    /// Seconds between periodic flushes
    pub flush_interval_secs: u64,

    /// Compress segment payloads with LZ4
    pub compression: bool,

    /// Maximum segment file size in bytes
    pub max_file_size: usize,

    /// Maximum events per segment file
    pub max_events_per_file: usize,

    /// Ceiling on total bytes across segment files
    pub max_total_disk_usage: u64,

    /// Seconds a segment file is kept before expiry
    pub retention_secs: u64,

    /// Append attempts before a write is abandoned
    pub max_attempts: u32,

    /// Milliseconds of base delay for retry backoff
    pub base_delay_ms: u64,
}

impl Default for BeaconConfig {
    fn default() -> Self {
        let disk = DiskWriterConfig::default();
        Self {
            directory: PathBuf::from("events"),
            capacity: 1000,
            drop_policy: DropPolicyConfig::DropOldest,
            flush_interval_secs: 5,
            compression: false,
            max_file_size: disk.max_file_size,
            max_events_per_file: disk.max_events_per_file,
            max_total_disk_usage: disk.max_total_disk_usage,
            retention_secs: disk.retention.as_secs(),
            max_attempts: disk.max_attempts,
            base_delay_ms: disk.base_delay.as_millis() as u64,
        }
    }
}

impl BeaconConfig {
    /// Flush interval as a duration.
    pub fn flush_interval(&self) -> Duration {
        Duration::from_secs(self.flush_interval_secs)
    }

    /// The disk-writer view of this configuration.
    pub fn disk_config(&self) -> DiskWriterConfig {
        DiskWriterConfig::default()
            .with_max_file_size(self.max_file_size)
            .with_max_events_per_file(self.max_events_per_file)
            .with_max_total_disk_usage(self.max_total_disk_usage)
            .with_retention(Duration::from_secs(self.retention_secs))
            .with_max_attempts(self.max_attempts)
            .with_base_delay(Duration::from_millis(self.base_delay_ms))
    }
}
