//! Subscriber management for live streams
//!
//! Each open stream has a router-side `Subscriber` that tracks:
//! - Unique ID
//! - Filter criteria (source, kind, origin)
//! - Channel sender for envelope delivery
//! - Shared state with the consumer's `Subscription` (drops, closed, evicted)
//!
//! The `SubscriberManager` handles registration, removal, and fan-out.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

use firehose_envelope::Envelope;

use crate::error::{Result, TapError};
use crate::filter::StreamFilter;
use crate::subscription::Subscription;

/// Default maximum number of concurrent subscribers
pub const DEFAULT_MAX_SUBSCRIBERS: usize = 1024;

/// Default per-subscription queue capacity
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// State shared between a `Subscriber` and its `Subscription`
#[derive(Debug, Default)]
pub(crate) struct SubscriberState {
    /// Envelopes dropped because the queue was full
    dropped: AtomicU64,
    /// Drops since the last successful enqueue
    consecutive_drops: AtomicU64,
    /// Closed by the consumer or unsubscribed
    closed: AtomicBool,
    /// Removed for persistent overflow
    evicted: AtomicBool,
}

impl SubscriberState {
    #[inline]
    pub(crate) fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    #[inline]
    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    #[inline]
    pub(crate) fn is_evicted(&self) -> bool {
        self.evicted.load(Ordering::Acquire)
    }

    /// Mark closed, returning true if this call closed it
    #[inline]
    pub(crate) fn close(&self) -> bool {
        !self.closed.swap(true, Ordering::AcqRel)
    }
}

/// Result of offering one envelope to one subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delivery {
    Sent,
    Dropped,
    /// Dropped, and this drop crossed the eviction threshold
    Evicted,
    /// Consumer is gone; entry can be pruned
    Disconnected,
}

/// Router-side handle for one open stream
#[derive(Debug)]
pub struct Subscriber {
    /// Unique identifier
    id: u64,
    /// Filter criteria
    filter: StreamFilter,
    /// Channel sender for envelope delivery
    sender: mpsc::Sender<Arc<Envelope>>,
    state: Arc<SubscriberState>,
}

impl Subscriber {
    fn new(
        id: u64,
        filter: StreamFilter,
        sender: mpsc::Sender<Arc<Envelope>>,
        state: Arc<SubscriberState>,
    ) -> Self {
        Self {
            id,
            filter,
            sender,
            state,
        }
    }

    /// Get the subscriber ID
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Get the filter
    #[inline]
    pub fn filter(&self) -> &StreamFilter {
        &self.filter
    }

    /// Check if an envelope matches this subscriber's filter
    #[inline]
    pub fn matches(&self, envelope: &Envelope) -> bool {
        self.filter.matches(envelope)
    }

    /// Envelopes dropped for this subscriber so far
    #[inline]
    pub fn dropped(&self) -> u64 {
        self.state.dropped()
    }

    /// Check if this subscriber can still receive envelopes
    #[inline]
    pub fn is_connected(&self) -> bool {
        !self.sender.is_closed() && !self.state.is_closed() && !self.state.is_evicted()
    }

    /// Offer an envelope without blocking
    ///
    /// A full queue drops the new envelope; older queued envelopes are kept.
    fn offer(&self, envelope: Arc<Envelope>, max_consecutive_drops: u64) -> Delivery {
        match self.sender.try_send(envelope) {
            Ok(()) => {
                self.state.consecutive_drops.store(0, Ordering::Relaxed);
                Delivery::Sent
            }
            Err(TrySendError::Full(_)) => {
                self.state.dropped.fetch_add(1, Ordering::Relaxed);
                let streak = self.state.consecutive_drops.fetch_add(1, Ordering::Relaxed) + 1;

                if max_consecutive_drops > 0
                    && streak >= max_consecutive_drops
                    && !self.state.evicted.swap(true, Ordering::AcqRel)
                {
                    return Delivery::Evicted;
                }
                Delivery::Dropped
            }
            Err(TrySendError::Closed(_)) => Delivery::Disconnected,
        }
    }
}

/// Outcome of one broadcast
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastOutcome {
    /// Subscribers that had the envelope enqueued
    pub delivered: usize,
    /// Matching subscribers whose queue was full
    pub dropped: usize,
    /// Subscribers evicted by this broadcast
    pub evicted: usize,
}

/// Manages all active subscribers
#[derive(Debug)]
pub struct SubscriberManager {
    /// Active subscribers
    subscribers: RwLock<Vec<Arc<Subscriber>>>,
    /// Mirrors `!subscribers.is_empty()`, only written under the write lock
    has_subscribers: AtomicBool,
    /// Next subscriber ID
    next_id: AtomicU64,
    queue_capacity: usize,
    max_subscribers: usize,
    /// 0 = never evict
    max_consecutive_drops: u64,
}

impl SubscriberManager {
    /// Create a subscriber manager with default limits
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_QUEUE_CAPACITY, DEFAULT_MAX_SUBSCRIBERS, 0)
    }

    /// Create a subscriber manager with explicit limits
    ///
    /// # Panics
    ///
    /// Panics if `queue_capacity` is zero; validate configuration first.
    pub fn with_limits(
        queue_capacity: usize,
        max_subscribers: usize,
        max_consecutive_drops: u64,
    ) -> Self {
        assert!(queue_capacity > 0, "queue capacity must be at least 1");
        Self {
            subscribers: RwLock::new(Vec::new()),
            has_subscribers: AtomicBool::new(false),
            next_id: AtomicU64::new(1),
            queue_capacity,
            max_subscribers,
            max_consecutive_drops,
        }
    }

    /// Register a new subscriber
    ///
    /// The subscriber sees every broadcast that starts after this returns.
    pub fn subscribe(&self, filter: StreamFilter) -> Result<Subscription> {
        let mut subscribers = self.subscribers.write();

        if subscribers.len() >= self.max_subscribers {
            // Make room from consumers that already went away
            subscribers.retain(|s| s.is_connected());
            if subscribers.len() >= self.max_subscribers {
                return Err(TapError::MaxSubscribers {
                    max: self.max_subscribers,
                });
            }
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = mpsc::channel(self.queue_capacity);
        let state = Arc::new(SubscriberState::default());

        subscribers.push(Arc::new(Subscriber::new(
            id,
            filter.clone(),
            sender,
            Arc::clone(&state),
        )));
        self.has_subscribers.store(true, Ordering::Release);

        Ok(Subscription::new(id, filter, receiver, state))
    }

    /// Unsubscribe by ID
    ///
    /// Releases the router's end of the queue; the consumer still drains
    /// what is already queued. Returns false if the ID is not registered.
    pub fn unsubscribe(&self, id: u64) -> bool {
        let mut subscribers = self.subscribers.write();
        let Some(pos) = subscribers.iter().position(|s| s.id() == id) else {
            return false;
        };

        let subscriber = subscribers.swap_remove(pos);
        subscriber.state.close();
        self.has_subscribers
            .store(!subscribers.is_empty(), Ordering::Release);
        true
    }

    /// Get number of registered subscribers
    pub fn count(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Check if there are any subscribers
    #[inline]
    pub fn has_subscribers(&self) -> bool {
        self.has_subscribers.load(Ordering::Acquire)
    }

    /// Broadcast an envelope to all matching subscribers
    ///
    /// Never blocks on a consumer. Subscribers found disconnected or evicted
    /// are pruned after the read lock is released.
    pub fn broadcast(&self, envelope: &Arc<Envelope>) -> BroadcastOutcome {
        let mut outcome = BroadcastOutcome::default();
        let mut stale: Vec<u64> = Vec::new();

        {
            let subscribers = self.subscribers.read();

            for subscriber in subscribers.iter() {
                if subscriber.state.is_closed() || subscriber.state.is_evicted() {
                    stale.push(subscriber.id());
                    continue;
                }

                if !subscriber.matches(envelope) {
                    continue;
                }

                match subscriber.offer(Arc::clone(envelope), self.max_consecutive_drops) {
                    Delivery::Sent => outcome.delivered += 1,
                    Delivery::Dropped => outcome.dropped += 1,
                    Delivery::Evicted => {
                        outcome.dropped += 1;
                        outcome.evicted += 1;
                        warn!(
                            subscriber_id = subscriber.id(),
                            dropped = subscriber.dropped(),
                            "evicting slow subscriber"
                        );
                        stale.push(subscriber.id());
                    }
                    Delivery::Disconnected => stale.push(subscriber.id()),
                }
            }
        }

        if !stale.is_empty() {
            self.remove_ids(&stale);
        }

        outcome
    }

    /// Clean up closed, evicted, and dropped subscribers
    pub fn cleanup_disconnected(&self) -> usize {
        let mut subscribers = self.subscribers.write();
        let original_len = subscribers.len();
        subscribers.retain(|s| s.is_connected());
        self.has_subscribers
            .store(!subscribers.is_empty(), Ordering::Release);
        original_len - subscribers.len()
    }

    /// Per-subscription queue capacity
    #[inline]
    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    /// Maximum concurrent subscribers
    #[inline]
    pub fn max_subscribers(&self) -> usize {
        self.max_subscribers
    }

    fn remove_ids(&self, ids: &[u64]) {
        let mut subscribers = self.subscribers.write();
        subscribers.retain(|s| !ids.contains(&s.id()));
        self.has_subscribers
            .store(!subscribers.is_empty(), Ordering::Release);
        debug!(removed = ids.len(), "pruned subscribers");
    }
}

impl Default for SubscriberManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "subscriber_test.rs"]
mod tests;
