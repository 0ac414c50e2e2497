//! Per-source recent history
//!
//! `HistoryStore` keeps the last N envelopes for every source it has seen.
//! The source registry is behind a `RwLock` that is only write-locked when a
//! source appears for the first time; each source's ring has its own mutex,
//! so appends for different sources never contend.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, trace};

use firehose_envelope::{Envelope, SourceId};

use crate::error::{HistoryError, Result};
use crate::ring::SourceRing;

/// Default envelopes retained per source
pub const DEFAULT_CAPACITY: usize = 100;

/// Largest accepted per-source capacity
pub const MAX_CAPACITY: usize = 100_000;

/// Bounded recent history, partitioned by source
#[derive(Debug)]
pub struct HistoryStore {
    sources: RwLock<HashMap<SourceId, Arc<Mutex<SourceRing>>>>,
    /// Envelopes retained per source
    capacity: usize,
    /// Maximum distinct sources (0 = unlimited)
    max_sources: usize,
    /// Total envelopes appended across all sources
    total_appended: AtomicU64,
}

impl HistoryStore {
    /// Create a store with default capacity and no source limit
    pub fn new() -> Self {
        Self::build(DEFAULT_CAPACITY, 0)
    }

    /// Create a store retaining `capacity` envelopes per source
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::InvalidCapacity` unless
    /// `1 <= capacity <= MAX_CAPACITY`.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Self::with_limits(capacity, 0)
    }

    /// Create a store with a per-source capacity and a source limit
    ///
    /// `max_sources == 0` means unlimited: every distinct source id stays
    /// registered for the life of the store.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::InvalidCapacity` unless
    /// `1 <= capacity <= MAX_CAPACITY`.
    pub fn with_limits(capacity: usize, max_sources: usize) -> Result<Self> {
        if !(1..=MAX_CAPACITY).contains(&capacity) {
            return Err(HistoryError::InvalidCapacity {
                capacity,
                max: MAX_CAPACITY,
            });
        }
        Ok(Self::build(capacity, max_sources))
    }

    fn build(capacity: usize, max_sources: usize) -> Self {
        Self {
            sources: RwLock::new(HashMap::new()),
            capacity,
            max_sources,
            total_appended: AtomicU64::new(0),
        }
    }

    /// Append an envelope to its source's history
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::SourceLimit` if this is a new source and the
    /// store already tracks `max_sources` sources. Existing sources are
    /// never rejected.
    pub fn append(&self, envelope: Arc<Envelope>) -> Result<()> {
        let ring = self.ring_for(envelope.source_id())?;

        let evicted = ring.lock().push(envelope);
        self.total_appended.fetch_add(1, Ordering::Relaxed);
        if evicted {
            trace!("evicted oldest envelope from history");
        }

        Ok(())
    }

    /// Snapshot of a source's history, oldest first
    ///
    /// Unknown sources return an empty vec.
    pub fn query(&self, source_id: &str) -> Vec<Arc<Envelope>> {
        self.existing_ring(source_id)
            .map(|ring| ring.lock().snapshot())
            .unwrap_or_default()
    }

    /// Last `n` envelopes of a source's history, oldest first
    pub fn last_n(&self, source_id: &str, n: usize) -> Vec<Arc<Envelope>> {
        if n == 0 {
            return Vec::new();
        }
        self.existing_ring(source_id)
            .map(|ring| ring.lock().last_n(n))
            .unwrap_or_default()
    }

    /// Number of envelopes currently retained for a source
    pub fn len(&self, source_id: &str) -> usize {
        self.existing_ring(source_id)
            .map(|ring| ring.lock().len())
            .unwrap_or(0)
    }

    /// Total envelopes ever appended for a source (including evicted ones)
    pub fn total_written(&self, source_id: &str) -> u64 {
        self.existing_ring(source_id)
            .map(|ring| ring.lock().total_written())
            .unwrap_or(0)
    }

    /// Check if no source has any history
    pub fn is_empty(&self) -> bool {
        self.sources.read().is_empty()
    }

    /// Number of sources with history
    pub fn source_count(&self) -> usize {
        self.sources.read().len()
    }

    /// Sources with history, sorted
    pub fn sources(&self) -> Vec<SourceId> {
        let mut ids: Vec<_> = self.sources.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Per-source capacity
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Source limit (0 = unlimited)
    #[inline]
    pub fn max_sources(&self) -> usize {
        self.max_sources
    }

    /// Total envelopes appended across all sources
    pub fn total_appended(&self) -> u64 {
        self.total_appended.load(Ordering::Relaxed)
    }

    /// Drop all history
    pub fn clear(&self) {
        self.sources.write().clear();
    }

    fn existing_ring(&self, source_id: &str) -> Option<Arc<Mutex<SourceRing>>> {
        self.sources.read().get(source_id).cloned()
    }

    fn ring_for(&self, source_id: &SourceId) -> Result<Arc<Mutex<SourceRing>>> {
        if let Some(ring) = self.existing_ring(source_id.as_str()) {
            return Ok(ring);
        }

        let mut sources = self.sources.write();

        // Another writer may have inserted it between the two locks
        if let Some(ring) = sources.get(source_id) {
            return Ok(Arc::clone(ring));
        }

        if self.max_sources > 0 && sources.len() >= self.max_sources {
            return Err(HistoryError::SourceLimit {
                max: self.max_sources,
                source_id: source_id.to_string(),
            });
        }

        let ring = Arc::new(Mutex::new(SourceRing::new(self.capacity)));
        sources.insert(source_id.clone(), Arc::clone(&ring));
        debug!(source = %source_id, capacity = self.capacity, "tracking history for new source");

        Ok(ring)
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
