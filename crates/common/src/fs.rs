//! Filesystem abstraction
//!
//! All disk access in the pipeline goes through this trait so that write
//! failures, attribute lookups, and deletions can be simulated in tests.
//! Failures surface as `io::Error` with a meaningful [`io::ErrorKind`],
//! never as silent truncation; the retry layer classifies kinds into
//! transient and persistent failures.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Size and creation time of a managed file.
#[derive(Debug, Clone, Copy)]
pub struct FileInfo {
    /// File size in bytes
    pub size: u64,

    /// Creation time (falls back to last modification where the
    /// platform does not record birth time)
    pub created: SystemTime,
}

/// Synchronous filesystem operations used by the persistence layer.
///
/// Implementations may block; callers run them through a [`Scheduler`]
/// when off-context execution matters.
///
/// [`Scheduler`]: crate::Scheduler
pub trait FileSystem: Send + Sync {
    /// Append bytes to a file, creating it if absent.
    fn append(&self, data: &[u8], path: &Path) -> io::Result<()>;

    /// Replace a file's contents atomically.
    fn write_atomic(&self, data: &[u8], path: &Path) -> io::Result<()>;

    /// List the regular files in a directory, skipping hidden entries.
    fn list_dir(&self, dir: &Path) -> io::Result<Vec<PathBuf>>;

    /// Size and creation time of a file.
    fn metadata(&self, path: &Path) -> io::Result<FileInfo>;

    /// Delete a file.
    fn remove(&self, path: &Path) -> io::Result<()>;
}

/// Production [`FileSystem`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdFileSystem;

impl StdFileSystem {
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for StdFileSystem {
    fn append(&self, data: &[u8], path: &Path) -> io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(data)
    }

    fn write_atomic(&self, data: &[u8], path: &Path) -> io::Result<()> {
        // Write to a sibling temp file, then rename into place. Rename is
        // atomic within a directory, so readers never observe a partial file.
        let tmp = match path.file_name() {
            Some(name) => {
                let mut tmp_name = name.to_os_string();
                tmp_name.push(".tmp");
                path.with_file_name(tmp_name)
            }
            None => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("not a file path: {}", path.display()),
                ));
            }
        };

        fs::write(&tmp, data)?;
        fs::rename(&tmp, path)
    }

    fn list_dir(&self, dir: &Path) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();

            let hidden = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with('.'));
            if hidden || !entry.file_type()?.is_file() {
                continue;
            }

            files.push(path);
        }
        Ok(files)
    }

    fn metadata(&self, path: &Path) -> io::Result<FileInfo> {
        let meta = fs::metadata(path)?;
        let created = meta.created().or_else(|_| meta.modified())?;
        Ok(FileInfo {
            size: meta.len(),
            created,
        })
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }
}

#[cfg(test)]
#[path = "fs_test.rs"]
mod fs_test;
