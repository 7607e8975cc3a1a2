//! Disk cleanup policy enforcement
//!
//! Best-effort, two-phase pass over the managed directory: expired files
//! go first, then the oldest remaining files until total usage fits the
//! quota. Filesystem errors are routed to an optional hook and a log
//! line; a failed step degrades the pass, never the caller, and the next
//! invocation retries from scratch.

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use beacon_common::{FileInfo, FileSystem};

/// Callback receiving filesystem errors encountered during cleanup.
pub type CleanupErrorHook = Box<dyn Fn(&io::Error) + Send + Sync + 'static>;

/// Enforces file-age expiry and the total-disk-usage ceiling.
pub struct CleanupManager {
    directory: PathBuf,
    fs: Arc<dyn FileSystem>,
    retention: Duration,
    max_total_disk_usage: u64,
    error_hook: Option<CleanupErrorHook>,
}

impl CleanupManager {
    /// Create a manager for `directory`.
    pub fn new(
        directory: PathBuf,
        fs: Arc<dyn FileSystem>,
        retention: Duration,
        max_total_disk_usage: u64,
    ) -> Self {
        Self {
            directory,
            fs,
            retention,
            max_total_disk_usage,
            error_hook: None,
        }
    }

    /// Attach an error hook; without one, cleanup errors are only logged.
    pub fn with_error_hook(mut self, hook: CleanupErrorHook) -> Self {
        self.error_hook = Some(hook);
        self
    }

    /// Run one cleanup pass. Never fails and never panics; all errors
    /// degrade to a partial pass.
    pub fn perform_cleanup(&self) {
        self.remove_expired(SystemTime::now());
        self.enforce_quota();
    }

    /// Phase 1: delete files older than the retention duration.
    fn remove_expired(&self, now: SystemTime) {
        let files = match self.fs.list_dir(&self.directory) {
            Ok(files) => files,
            Err(e) => {
                self.report(&e);
                return;
            }
        };

        for path in files {
            let info = match self.fs.metadata(&path) {
                Ok(info) => info,
                Err(e) => {
                    self.report(&e);
                    continue;
                }
            };

            let age = now.duration_since(info.created).unwrap_or_default();
            if age > self.retention {
                tracing::debug!(path = %path.display(), age_secs = age.as_secs(), "removing expired file");
                if let Err(e) = self.fs.remove(&path) {
                    self.report(&e);
                }
            }
        }
    }

    /// Phase 2: if total usage exceeds the ceiling, delete oldest-first
    /// until it fits.
    fn enforce_quota(&self) {
        let files = match self.fs.list_dir(&self.directory) {
            Ok(files) => files,
            Err(e) => {
                self.report(&e);
                return;
            }
        };

        let mut infos: Vec<(PathBuf, FileInfo)> = Vec::with_capacity(files.len());
        let mut total: u64 = 0;
        for path in files {
            match self.fs.metadata(&path) {
                Ok(info) => {
                    total += info.size;
                    infos.push((path, info));
                }
                Err(e) => self.report(&e),
            }
        }

        if total <= self.max_total_disk_usage {
            return;
        }

        infos.sort_by_key(|(_, info)| info.created);

        for (path, info) in infos {
            match self.fs.remove(&path) {
                Ok(()) => {
                    total = total.saturating_sub(info.size);
                    tracing::debug!(
                        path = %path.display(),
                        freed = info.size,
                        remaining = total,
                        "removed file for disk quota"
                    );
                    if total <= self.max_total_disk_usage {
                        break;
                    }
                }
                Err(e) => self.report(&e),
            }
        }
    }

    fn report(&self, error: &io::Error) {
        tracing::warn!(error = %error, directory = %self.directory.display(), "cleanup step failed");
        if let Some(hook) = &self.error_hook {
            hook(error);
        }
    }
}

#[cfg(test)]
#[path = "cleanup_test.rs"]
mod cleanup_test;
