//! Critical error escalation

use crate::ScheduleError;

/// Receives write failures the pipeline cannot recover from.
///
/// Invoked exactly once per write that exhausts its retry budget or hits
/// a persistent error. Hosts typically log, alert, or disable the
/// pipeline in response.
pub trait CriticalErrorHandler: Send + Sync {
    /// Handle an unrecoverable write failure.
    fn handle(&self, error: &ScheduleError);
}
