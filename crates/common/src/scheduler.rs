//! Work scheduling contract
//!
//! Injection point for executing work off the caller's context: blocking
//! disk I/O goes through [`Scheduler::schedule_blocking`], background async
//! work (a flush tick) through [`Scheduler::schedule`]. Substituting the
//! scheduler lets tests run operations inline, never, or always-failing
//! without touching real tasks or threads.

use std::future::Future;
use std::io;
use std::pin::Pin;

use async_trait::async_trait;
use thiserror::Error;

/// A blocking operation handed to the scheduler.
pub type BlockingOp = Box<dyn FnOnce() -> io::Result<()> + Send + 'static>;

/// An async task handed to the scheduler.
pub type TaskFuture = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Failure of a scheduled operation.
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// The operation itself failed
    #[error("scheduled operation failed: {0}")]
    Io(#[from] io::Error),

    /// The scheduler could not run the operation to completion
    /// (rejected, cancelled, or panicked)
    #[error("scheduler failed to run the operation: {0}")]
    Rejected(String),
}

impl ScheduleError {
    /// The underlying I/O error, when the operation ran and failed.
    pub fn as_io(&self) -> Option<&io::Error> {
        match self {
            Self::Io(e) => Some(e),
            Self::Rejected(_) => None,
        }
    }
}

/// Executes work off the caller's execution context.
#[async_trait]
pub trait Scheduler: Send + Sync {
    /// Run an async task to completion.
    async fn schedule(&self, task: TaskFuture) -> Result<(), ScheduleError>;

    /// Run a blocking operation without stalling the async context.
    async fn schedule_blocking(&self, op: BlockingOp) -> Result<(), ScheduleError>;
}

/// Production [`Scheduler`] backed by the tokio runtime.
///
/// Async tasks run via `tokio::spawn`; blocking operations via
/// `tokio::task::spawn_blocking`. A panicking operation surfaces as
/// [`ScheduleError::Rejected`] instead of tearing down the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

impl TokioScheduler {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Scheduler for TokioScheduler {
    async fn schedule(&self, task: TaskFuture) -> Result<(), ScheduleError> {
        tokio::spawn(task)
            .await
            .map_err(|e| ScheduleError::Rejected(e.to_string()))
    }

    async fn schedule_blocking(&self, op: BlockingOp) -> Result<(), ScheduleError> {
        match tokio::task::spawn_blocking(op).await {
            Ok(result) => result.map_err(ScheduleError::Io),
            Err(e) => Err(ScheduleError::Rejected(e.to_string())),
        }
    }
}

#[cfg(test)]
#[path = "scheduler_test.rs"]
mod scheduler_test;
