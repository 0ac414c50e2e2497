//! Fixed-capacity ring of envelopes for a single source
//!
//! Slots are filled by push until the ring is full, then overwritten at
//! `write_pos`, so the oldest envelope is always the one evicted.

use std::sync::Arc;

use firehose_envelope::Envelope;

#[derive(Debug)]
pub(crate) struct SourceRing {
    /// Filled slots (grows to `capacity`, then fixed)
    slots: Vec<Arc<Envelope>>,
    /// Next slot to overwrite once full
    write_pos: usize,
    /// Total envelopes ever pushed
    total_written: u64,
    capacity: usize,
}

impl SourceRing {
    pub(crate) fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0);
        Self {
            slots: Vec::new(),
            write_pos: 0,
            total_written: 0,
            capacity,
        }
    }

    /// Push to the tail, evicting the head when full
    ///
    /// Returns true if an envelope was evicted.
    pub(crate) fn push(&mut self, envelope: Arc<Envelope>) -> bool {
        let evicted = if self.slots.len() < self.capacity {
            self.slots.push(envelope);
            false
        } else {
            self.slots[self.write_pos] = envelope;
            true
        };
        self.write_pos = (self.write_pos + 1) % self.capacity;
        self.total_written += 1;
        evicted
    }

    /// Copy of the retained envelopes, oldest first
    pub(crate) fn snapshot(&self) -> Vec<Arc<Envelope>> {
        if self.slots.len() < self.capacity {
            return self.slots.clone();
        }

        // Full: write_pos points at the oldest slot
        let mut result = Vec::with_capacity(self.capacity);
        result.extend_from_slice(&self.slots[self.write_pos..]);
        result.extend_from_slice(&self.slots[..self.write_pos]);
        result
    }

    /// Last `n` retained envelopes, oldest first
    pub(crate) fn last_n(&self, n: usize) -> Vec<Arc<Envelope>> {
        let mut all = self.snapshot();
        let skip = all.len().saturating_sub(n);
        all.drain(..skip);
        all
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub(crate) fn total_written(&self) -> u64 {
        self.total_written
    }
}
