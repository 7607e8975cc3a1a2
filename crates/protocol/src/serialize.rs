//! Batch serializers
//!
//! The pipeline hands batches of events to the persistence layer as bytes;
//! the serializer decides the byte format. Implementations must round-trip
//! losslessly for every supported attribute kind.

use std::io::{Read, Write};

use lz4_flex::frame::{FrameDecoder, FrameEncoder};

use crate::{Event, ProtocolError};

/// Encodes batches of events to bytes and back.
///
/// `decode(encode(batch)) == batch` must hold for any batch.
pub trait EventSerializer: Send + Sync {
    /// Serialize a batch of events.
    fn encode(&self, events: &[Event]) -> Result<Vec<u8>, ProtocolError>;

    /// Deserialize a batch of events.
    fn decode(&self, bytes: &[u8]) -> Result<Vec<Event>, ProtocolError>;
}

/// Plain JSON serializer: a batch is a JSON array of events.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl JsonSerializer {
    pub fn new() -> Self {
        Self
    }
}

impl EventSerializer for JsonSerializer {
    fn encode(&self, events: &[Event]) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(events).map_err(ProtocolError::Encode)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Vec<Event>, ProtocolError> {
        serde_json::from_slice(bytes).map_err(ProtocolError::Decode)
    }
}

/// LZ4-compressed JSON serializer.
///
/// Encodes the batch as JSON and wraps it in an LZ4 frame. Event payloads
/// are highly repetitive (shared attribute keys, similar names), so frames
/// are typically a fraction of the plain JSON size.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lz4JsonSerializer;

impl Lz4JsonSerializer {
    pub fn new() -> Self {
        Self
    }
}

impl EventSerializer for Lz4JsonSerializer {
    fn encode(&self, events: &[Event]) -> Result<Vec<u8>, ProtocolError> {
        let json = serde_json::to_vec(events).map_err(ProtocolError::Encode)?;

        let mut encoder = FrameEncoder::new(Vec::with_capacity(json.len() / 2));
        encoder
            .write_all(&json)
            .map_err(|e| ProtocolError::Compression(e.to_string()))?;
        encoder
            .finish()
            .map_err(|e| ProtocolError::Compression(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<Vec<Event>, ProtocolError> {
        let mut decoder = FrameDecoder::new(bytes);
        let mut json = Vec::new();
        decoder
            .read_to_end(&mut json)
            .map_err(|e| ProtocolError::Compression(e.to_string()))?;

        serde_json::from_slice(&json).map_err(ProtocolError::Decode)
    }
}

#[cfg(test)]
#[path = "serialize_test.rs"]
mod serialize_test;
