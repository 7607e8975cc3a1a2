//! Segment file naming
//!
//! File names are produced by an injectable strategy so hosts can match
//! their own conventions. The default is timestamp plus a unique suffix,
//! which sorts roughly by creation time and never collides.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Produces a file name for a segment created at the given instant.
pub type FileNamingStrategy = Arc<dyn Fn(DateTime<Utc>) -> String + Send + Sync>;

/// Default name: `events-{unix_seconds}-{uuid}.dat`.
pub fn default_file_name(now: DateTime<Utc>) -> String {
    format!("events-{}-{}.dat", now.timestamp(), Uuid::new_v4().simple())
}

/// The default strategy as an injectable value.
pub fn default_naming_strategy() -> FileNamingStrategy {
    Arc::new(default_file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_default_name_shape() {
        let at = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        let name = default_file_name(at);

        assert!(name.starts_with(&format!("events-{}-", at.timestamp())));
        assert!(name.ends_with(".dat"));
    }

    #[test]
    fn test_names_are_unique_within_a_second() {
        let at = Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap();
        assert_ne!(default_file_name(at), default_file_name(at));
    }
}
