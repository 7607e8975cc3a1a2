//! Beacon - Buffer
//!
//! Bounded in-memory event buffering and flush scheduling.
//!
//! # Architecture
//!
//! ```text
//! [producers] --add--> [EventBuffer / RingBuffer] --flush--> [EventPersisting]
//!                            ^
//!                            | timer tick / lifecycle signal / manual
//!                      [FlushController]
//! ```
//!
//! Producers call [`EventBuffer::add`] from arbitrary tasks; the ring
//! buffer's mutex is the only serialization point and holds no I/O.
//! Flushing drains the buffer atomically and hands the batch to the
//! persistence sink. The [`FlushController`] decides *when* to flush:
//! on a timer, on demand, and when the host signals imminent suspension.
//!
//! Memory is bounded by the ring capacity under any input rate; overload
//! evicts per the configured [`DropPolicy`] and is observable through
//! the dropped counter.

mod event_buffer;
mod flush_controller;
mod ring;

pub use event_buffer::EventBuffer;
pub use flush_controller::{FlushController, SCHEDULE_FAILURE_COOLDOWN};
pub use ring::{DropPolicy, RingBuffer};
