//! Metrics emission contract
//!
//! Fire-and-forget counters and gauges. Emission must never block or fail;
//! hosts forward metrics to their monitoring backend of choice.

/// Metric names emitted by the pipeline.
pub mod names {
    /// Batch written and handed off durably (value: events in the batch)
    pub const WRITE_SUCCESS: &str = "file.write.success";

    /// Write aborted before handoff (tag `error`: failure reason)
    pub const WRITE_FAILURE: &str = "file.write.failure";

    /// Current file rolled to a new one
    pub const FILE_ROTATION: &str = "file.rotation";

    /// One append attempt inside the retry loop (tag `status`: success/failed)
    pub const RETRY_ATTEMPT: &str = "file.write.retry_attempt";

    /// Write abandoned after exhausting retries or hitting a persistent error
    pub const RETRY_EXCEEDED: &str = "file.write.retry_exceeded";

    /// Periodic flush could not be dispatched through the scheduler
    pub const FLUSH_SCHEDULE_FAILURE: &str = "flush.schedule.failure";
}

/// Sink for pipeline metrics.
pub trait MetricsEmitter: Send + Sync {
    /// Emit a single metric sample.
    fn emit(&self, name: &'static str, value: f64, tags: &[(&'static str, String)]);
}

/// Discards all metrics. Default when the host does not wire a backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl NoopMetrics {
    pub fn new() -> Self {
        Self
    }
}

impl MetricsEmitter for NoopMetrics {
    fn emit(&self, _name: &'static str, _value: f64, _tags: &[(&'static str, String)]) {}
}
