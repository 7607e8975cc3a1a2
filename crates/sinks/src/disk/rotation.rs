//! File rotation policy
//!
//! Pure decision logic, kept apart from the writer so threshold behavior
//! is testable without touching a disk.

/// Decides when the current segment file must be rolled.
#[derive(Debug, Clone, Copy)]
pub struct RotationPolicy {
    max_size: usize,
    max_events: usize,
}

impl RotationPolicy {
    /// Create a policy with size and event-count ceilings per file.
    pub fn new(max_size: usize, max_events: usize) -> Self {
        Self { max_size, max_events }
    }

    /// Whether appending `new_data_size` bytes / `new_event_count` events
    /// to the current file would breach either ceiling.
    ///
    /// Rotation happens *before* the append: a batch is never split
    /// across two files.
    pub fn should_rotate(
        &self,
        current_size: usize,
        current_events: usize,
        new_data_size: usize,
        new_event_count: usize,
    ) -> bool {
        current_size + new_data_size > self.max_size
            || current_events + new_event_count > self.max_events
    }
}
