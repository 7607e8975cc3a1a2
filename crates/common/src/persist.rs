//! Persistence sink contract

use async_trait::async_trait;

use beacon_protocol::Event;

/// Async sink that receives drained event batches.
///
/// Implementations must not surface errors to the caller: a failed write
/// terminates in metrics emission or critical-error escalation inside the
/// sink, never in the producer path.
#[async_trait]
pub trait EventPersisting: Send + Sync {
    /// Persist a batch of events. The batch is never empty.
    async fn write(&self, events: Vec<Event>);
}
