//! Protocol error types

use thiserror::Error;

/// Errors from event encoding and decoding.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Batch could not be encoded
    #[error("event batch encoding failed: {0}")]
    Encode(#[source] serde_json::Error),

    /// Bytes could not be decoded into events
    #[error("event batch decoding failed: {0}")]
    Decode(#[source] serde_json::Error),

    /// Compression or decompression failed
    #[error("batch compression failed: {0}")]
    Compression(String),
}

/// Result type for protocol operations.
pub type Result<T> = std::result::Result<T, ProtocolError>;
