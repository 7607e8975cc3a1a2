//! Fixed-capacity circular buffer
//!
//! Overwrite-safe circular store with a configurable policy for full-buffer
//! inserts. All operations are linearizable: a single internal mutex guards
//! the slots, and the critical section contains no I/O and no blocking, so
//! concurrent producers serialize without stalling each other.

use parking_lot::Mutex;

/// What to discard when inserting into a full buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DropPolicy {
    /// Evict the logically oldest element to make room
    #[default]
    DropOldest,
    /// Discard the incoming element
    DropNewest,
}

struct RingState<T> {
    slots: Vec<Option<T>>,
    head: usize,
    len: usize,
    dropped: u64,
}

/// Fixed-capacity FIFO ring with a drop policy fixed at construction.
///
/// Insertion order is preserved; `len <= capacity` always holds; every
/// discarded element (evicted or rejected) increments the dropped counter.
pub struct RingBuffer<T> {
    state: Mutex<RingState<T>>,
    capacity: usize,
    policy: DropPolicy,
}

impl<T> RingBuffer<T> {
    /// Create a buffer holding at most `capacity` elements.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize, policy: DropPolicy) -> Self {
        assert!(capacity > 0, "ring buffer capacity must be greater than zero");

        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);

        Self {
            state: Mutex::new(RingState {
                slots,
                head: 0,
                len: 0,
                dropped: 0,
            }),
            capacity,
            policy,
        }
    }

    /// Insert an element, applying the drop policy when full.
    ///
    /// Returns whether the element was accepted: always `true` under
    /// drop-oldest (the oldest element is evicted), `false` under
    /// drop-newest when full.
    pub fn push(&self, item: T) -> bool {
        let mut state = self.state.lock();

        if state.len == self.capacity {
            match self.policy {
                DropPolicy::DropOldest => {
                    let head = state.head;
                    state.slots[head] = Some(item);
                    state.head = (head + 1) % self.capacity;
                    state.dropped += 1;
                    true
                }
                DropPolicy::DropNewest => {
                    state.dropped += 1;
                    false
                }
            }
        } else {
            let index = (state.head + state.len) % self.capacity;
            state.slots[index] = Some(item);
            state.len += 1;
            true
        }
    }

    /// Atomically remove and return all held elements in FIFO order.
    pub fn drain(&self) -> Vec<T> {
        let mut state = self.state.lock();

        let mut out = Vec::with_capacity(state.len);
        for i in 0..state.len {
            let index = (state.head + i) % self.capacity;
            if let Some(item) = state.slots[index].take() {
                out.push(item);
            }
        }

        state.head = 0;
        state.len = 0;
        out
    }

    /// Number of elements currently held.
    pub fn len(&self) -> usize {
        self.state.lock().len
    }

    /// Whether the buffer holds no elements.
    pub fn is_empty(&self) -> bool {
        self.state.lock().len == 0
    }

    /// Whether the buffer is at capacity.
    pub fn is_full(&self) -> bool {
        self.state.lock().len == self.capacity
    }

    /// Total elements discarded since construction.
    pub fn dropped_count(&self) -> u64 {
        self.state.lock().dropped
    }

    /// The fixed capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The drop policy fixed at construction.
    #[inline]
    pub fn policy(&self) -> DropPolicy {
        self.policy
    }
}

#[cfg(test)]
#[path = "ring_test.rs"]
mod ring_test;
