//! Ingestion metrics
//!
//! Atomic counters for tracking the ingestion endpoint.
//! All operations use relaxed ordering; values are eventually consistent.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Counters for the ingestion endpoint
///
/// All methods are safe to call from multiple threads concurrently.
#[derive(Debug, Default)]
pub struct IngestMetrics {
    /// Envelopes offered to `ingest` / `ingest_raw`
    received: AtomicU64,

    /// Envelopes rejected as malformed
    malformed: AtomicU64,

    /// Envelopes appended to history
    stored: AtomicU64,

    /// History appends that failed
    history_failures: AtomicU64,

    /// Subscription enqueues (one envelope may count many times)
    deliveries: AtomicU64,

    /// Envelopes that reached no subscription
    undelivered: AtomicU64,
}

impl IngestMetrics {
    /// Create new metrics instance with all counters at zero
    #[inline]
    pub const fn new() -> Self {
        Self {
            received: AtomicU64::new(0),
            malformed: AtomicU64::new(0),
            stored: AtomicU64::new(0),
            history_failures: AtomicU64::new(0),
            deliveries: AtomicU64::new(0),
            undelivered: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn record_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_malformed(&self) {
        self.malformed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_stored(&self) {
        self.stored.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_history_failure(&self) {
        self.history_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the fan-out result of one envelope
    #[inline]
    pub fn record_delivered(&self, subscriptions: usize) {
        if subscriptions == 0 {
            self.undelivered.fetch_add(1, Ordering::Relaxed);
        } else {
            self.deliveries
                .fetch_add(subscriptions as u64, Ordering::Relaxed);
        }
    }

    /// Get a point-in-time copy of all counters
    #[inline]
    pub fn snapshot(&self) -> IngestSnapshot {
        IngestSnapshot {
            received: self.received.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
            stored: self.stored.load(Ordering::Relaxed),
            history_failures: self.history_failures.load(Ordering::Relaxed),
            deliveries: self.deliveries.load(Ordering::Relaxed),
            undelivered: self.undelivered.load(Ordering::Relaxed),
        }
    }

    /// Reset all metrics to zero
    pub fn reset(&self) {
        self.received.store(0, Ordering::Relaxed);
        self.malformed.store(0, Ordering::Relaxed);
        self.stored.store(0, Ordering::Relaxed);
        self.history_failures.store(0, Ordering::Relaxed);
        self.deliveries.store(0, Ordering::Relaxed);
        self.undelivered.store(0, Ordering::Relaxed);
    }
}

/// Point-in-time snapshot of ingest metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IngestSnapshot {
    pub received: u64,
    pub malformed: u64,
    pub stored: u64,
    pub history_failures: u64,
    pub deliveries: u64,
    pub undelivered: u64,
}

impl IngestSnapshot {
    /// Fraction of received envelopes that were accepted (0.0 - 1.0)
    ///
    /// Returns None if nothing has been received.
    #[inline]
    pub fn acceptance_rate(&self) -> Option<f64> {
        if self.received == 0 {
            None
        } else {
            Some((self.received - self.malformed) as f64 / self.received as f64)
        }
    }
}

/// Rate-limited warning for history append failures
///
/// A store that keeps rejecting (e.g. source limit reached) would otherwise
/// log once per envelope. Failures are counted and summarized at most once
/// per interval.
pub(crate) struct FailureLogger {
    /// Failures since the last log line
    interval_failures: AtomicU64,
    /// Last log time (epoch milliseconds)
    last_log_ms: AtomicU64,
}

/// Log interval in milliseconds
const LOG_INTERVAL_MS: u64 = 1000;

impl FailureLogger {
    pub(crate) fn new() -> Self {
        Self {
            interval_failures: AtomicU64::new(0),
            // First failure logs immediately
            last_log_ms: AtomicU64::new(0),
        }
    }

    /// Record a failure and log if the interval has elapsed
    ///
    /// Returns true if a log was emitted.
    pub(crate) fn record(&self, error: &dyn std::error::Error) -> bool {
        self.interval_failures.fetch_add(1, Ordering::Relaxed);

        let now = Self::now_ms();
        let last = self.last_log_ms.load(Ordering::Relaxed);
        if now.saturating_sub(last) < LOG_INTERVAL_MS {
            return false;
        }

        // Claim the log slot so concurrent callers don't duplicate it
        if self
            .last_log_ms
            .compare_exchange(last, now, Ordering::SeqCst, Ordering::Relaxed)
            .is_err()
        {
            return false;
        }

        let failures = self.interval_failures.swap(0, Ordering::Relaxed);
        tracing::warn!(
            failures,
            error = %error,
            "history append failed, envelopes still broadcast"
        );
        true
    }

    fn now_ms() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

impl std::fmt::Debug for FailureLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FailureLogger")
            .field(
                "interval_failures",
                &self.interval_failures.load(Ordering::Relaxed),
            )
            .finish()
    }
}
