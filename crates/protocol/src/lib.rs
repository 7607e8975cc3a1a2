//! Beacon - Protocol
//!
//! Event data model and batch serializers for the Beacon telemetry pipeline.
//!
//! # Overview
//!
//! An [`Event`] is an immutable record produced by the host application:
//! a unique id, a name, a timestamp, and a map of typed attribute values.
//! Attributes use the closed [`AttributeValue`] union rather than an open
//! dynamic type so encode/decode stays allocation-light and type-safe.
//!
//! Batches of events cross the persistence boundary as bytes through an
//! [`EventSerializer`]. Two implementations are provided:
//!
//! | Serializer | Format |
//! |------------|--------|
//! | [`JsonSerializer`] | JSON array of events |
//! | [`Lz4JsonSerializer`] | LZ4-framed JSON array |
//!
//! Both round-trip losslessly for every supported attribute kind.

mod attribute;
mod error;
mod event;
mod serialize;

pub use attribute::AttributeValue;
pub use error::ProtocolError;
pub use event::{Event, EventId};
pub use serialize::{EventSerializer, JsonSerializer, Lz4JsonSerializer};
