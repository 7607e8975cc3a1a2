//! Telemetry event record
//!
//! Events are created by producers, immutable thereafter, and owned by
//! whichever buffer currently holds them. They are destroyed on flush
//! (moved into a serialized batch) or on overwrite-eviction.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AttributeValue;

/// Unique identifier for an [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(Uuid);

impl EventId {
    /// Generate a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Derive a deterministic id from a name.
    ///
    /// The same name always yields the same id. Intended for tests and
    /// fixtures where stable ids make assertions readable.
    pub fn from_name(name: &str) -> Self {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        name.hash(&mut hasher);
        let hi = hasher.finish();
        // Second independent half so distinct names rarely collide on
        // more than 64 bits.
        hi.hash(&mut hasher);
        let lo = hasher.finish();

        let mut bytes = [0u8; 16];
        bytes[..8].copy_from_slice(&hi.to_be_bytes());
        bytes[8..].copy_from_slice(&lo.to_be_bytes());
        Self(Uuid::from_bytes(bytes))
    }

    /// The underlying UUID.
    #[inline]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A single telemetry event.
///
/// Immutable once constructed; the `with_*` methods consume and return
/// the event for fluent construction before it enters the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Unique event id
    pub id: EventId,

    /// Event name, e.g. `"app.launch"` or `"screen.view"`
    pub name: String,

    /// When the event occurred
    pub timestamp: DateTime<Utc>,

    /// Typed attribute values keyed by attribute name
    pub attributes: HashMap<String, AttributeValue>,
}

impl Event {
    /// Create an event with a fresh id, the current time, and no attributes.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: EventId::new(),
            name: name.into(),
            timestamp: Utc::now(),
            attributes: HashMap::new(),
        }
    }

    /// Attach an attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Override the timestamp. Useful for replay and tests.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Override the id. Useful for deterministic fixtures.
    pub fn with_id(mut self, id: EventId) -> Self {
        self.id = id;
        self
    }
}
