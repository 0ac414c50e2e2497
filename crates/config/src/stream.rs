//! Live stream configuration

use std::time::Duration;

use serde::Deserialize;

/// Live fan-out settings
///
/// # Example
///
/// ```toml
/// [stream]
/// queue_capacity = 256
/// max_subscribers = 1024
/// max_consecutive_drops = 0
/// cleanup_interval_secs = 5
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StreamConfig {
    /// Per-subscription queue capacity
    /// Default: 256
    pub queue_capacity: usize,

    /// Maximum concurrent subscriptions
    /// Default: 1024
    pub max_subscribers: usize,

    /// Evict a subscription after this many drops in a row (0 = never)
    /// Default: 0
    pub max_consecutive_drops: u64,

    /// Seconds between sweeps of closed subscriptions
    /// Default: 5
    pub cleanup_interval_secs: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 256,
            max_subscribers: 1024,
            max_consecutive_drops: 0,
            cleanup_interval_secs: 5,
        }
    }
}

impl StreamConfig {
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}
