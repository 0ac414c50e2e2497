//! Router - the live fan-out point
//!
//! `Router` sits between ingestion and stream consumers. It provides:
//!
//! - Near-zero cost when no subscribers (single atomic load)
//! - Metadata-only filtering per subscription
//! - Drop-newest slow-consumer policy with per-subscription counters
//! - Optional eviction of persistently overflowing subscribers
//! - Periodic cleanup of closed subscriptions
//!
//! # Usage
//!
//! ```
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! use std::sync::Arc;
//! use firehose_envelope::Envelope;
//! use firehose_tap::{Router, StreamFilter};
//!
//! let router = Router::new();
//! let mut sub = router.subscribe(StreamFilter::for_source("app-1")).unwrap();
//!
//! router.broadcast(Arc::new(Envelope::log("app-1", 1, "hello").unwrap()));
//! let env = sub.next().await.unwrap();
//! assert_eq!(env.timestamp(), 1);
//! # }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::{debug, trace};

use firehose_envelope::Envelope;

use crate::error::{Result, TapError};
use crate::filter::StreamFilter;
use crate::subscriber::{DEFAULT_MAX_SUBSCRIBERS, DEFAULT_QUEUE_CAPACITY, SubscriberManager};
use crate::subscription::Subscription;

/// Router configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouterConfig {
    /// Envelopes each subscription can hold before new ones are dropped
    pub queue_capacity: usize,
    /// Maximum concurrent subscriptions
    pub max_subscribers: usize,
    /// Evict after this many drops in a row (0 = never)
    pub max_consecutive_drops: u64,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            max_subscribers: DEFAULT_MAX_SUBSCRIBERS,
            max_consecutive_drops: 0,
        }
    }
}

impl RouterConfig {
    /// Check the configuration is usable
    pub fn validate(&self) -> Result<()> {
        if self.queue_capacity == 0 {
            return Err(TapError::InvalidConfig(
                "queue_capacity must be at least 1".into(),
            ));
        }
        if self.max_subscribers == 0 {
            return Err(TapError::InvalidConfig(
                "max_subscribers must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// The live fan-out point
#[derive(Debug)]
pub struct Router {
    /// Subscriber registry
    subscribers: SubscriberManager,
    /// Envelopes broadcast while at least one subscriber existed
    broadcast_count: AtomicU64,
    /// Total enqueues across all subscribers
    delivered_count: AtomicU64,
    /// Total drops across all subscribers
    dropped_count: AtomicU64,
    /// Subscribers evicted for persistent overflow
    evicted_count: AtomicU64,
}

impl Router {
    /// Create a router with default configuration
    pub fn new() -> Self {
        Self::from_manager(SubscriberManager::new())
    }

    /// Create a router with the given configuration
    ///
    /// # Errors
    ///
    /// Returns `TapError::InvalidConfig` for zero capacities.
    pub fn with_config(config: &RouterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_manager(SubscriberManager::with_limits(
            config.queue_capacity,
            config.max_subscribers,
            config.max_consecutive_drops,
        )))
    }

    fn from_manager(subscribers: SubscriberManager) -> Self {
        Self {
            subscribers,
            broadcast_count: AtomicU64::new(0),
            delivered_count: AtomicU64::new(0),
            dropped_count: AtomicU64::new(0),
            evicted_count: AtomicU64::new(0),
        }
    }

    /// Deliver an envelope to every matching subscription
    ///
    /// Never blocks. Returns the number of subscriptions it was enqueued on.
    #[inline]
    pub fn broadcast(&self, envelope: Arc<Envelope>) -> usize {
        // Fast path: no subscribers = no work
        if !self.subscribers.has_subscribers() {
            return 0;
        }

        self.broadcast_count.fetch_add(1, Ordering::Relaxed);

        let outcome = self.subscribers.broadcast(&envelope);
        if outcome.delivered > 0 {
            self.delivered_count
                .fetch_add(outcome.delivered as u64, Ordering::Relaxed);
            trace!(delivered = outcome.delivered, "broadcast envelope");
        }
        if outcome.dropped > 0 {
            self.dropped_count
                .fetch_add(outcome.dropped as u64, Ordering::Relaxed);
        }
        if outcome.evicted > 0 {
            self.evicted_count
                .fetch_add(outcome.evicted as u64, Ordering::Relaxed);
        }

        outcome.delivered
    }

    /// Open a new subscription
    ///
    /// Only envelopes broadcast after this returns are delivered.
    pub fn subscribe(&self, filter: StreamFilter) -> Result<Subscription> {
        let subscription = self.subscribers.subscribe(filter)?;

        debug!(
            subscription_id = subscription.id(),
            sources = ?subscription.filter().source_ids(),
            kinds = ?subscription.filter().kinds(),
            origins = ?subscription.filter().origins(),
            "new subscription"
        );

        Ok(subscription)
    }

    /// Close a subscription by ID
    ///
    /// Idempotent: returns false if it was already gone.
    pub fn unsubscribe(&self, id: u64) -> bool {
        let removed = self.subscribers.unsubscribe(id);
        if removed {
            debug!(subscription_id = id, "subscription removed");
        }
        removed
    }

    /// Get the number of registered subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.count()
    }

    /// Check if there are any subscriptions
    #[inline]
    pub fn has_subscribers(&self) -> bool {
        self.subscribers.has_subscribers()
    }

    /// Get router statistics
    pub fn stats(&self) -> RouterStats {
        RouterStats {
            broadcast_count: self.broadcast_count.load(Ordering::Relaxed),
            delivered_count: self.delivered_count.load(Ordering::Relaxed),
            dropped_count: self.dropped_count.load(Ordering::Relaxed),
            evicted_count: self.evicted_count.load(Ordering::Relaxed),
            subscriber_count: self.subscribers.count(),
        }
    }

    /// Remove closed and evicted subscriptions
    ///
    /// Called periodically by the maintenance task.
    pub fn cleanup(&self) -> usize {
        let removed = self.subscribers.cleanup_disconnected();
        if removed > 0 {
            debug!(removed, "cleaned up closed subscriptions");
        }
        removed
    }

    /// Spawn the maintenance task
    ///
    /// Runs `cleanup` every `interval` until the returned handle is aborted.
    pub fn spawn_maintenance(self: &Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        let router = Arc::clone(self);

        tokio::spawn(async move {
            let mut cleanup_interval = tokio::time::interval(interval);
            loop {
                cleanup_interval.tick().await;
                router.cleanup();
            }
        })
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics about the router
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouterStats {
    /// Envelopes broadcast while subscribers existed
    pub broadcast_count: u64,
    /// Total enqueues across subscriptions
    pub delivered_count: u64,
    /// Total drops across subscriptions
    pub dropped_count: u64,
    /// Subscriptions evicted for persistent overflow
    pub evicted_count: u64,
    /// Current number of subscriptions
    pub subscriber_count: usize,
}

#[cfg(test)]
#[path = "router_test.rs"]
mod tests;
