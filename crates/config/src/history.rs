//! Recent-history configuration

use serde::Deserialize;

/// Largest accepted `capacity`; matches the history store's limit
pub const MAX_HISTORY_CAPACITY: usize = 100_000;

/// Per-source recent-history window
///
/// # Example
///
/// ```toml
/// [history]
/// capacity = 100
/// max_sources = 0
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HistoryConfig {
    /// Envelopes retained per source, `1..=MAX_HISTORY_CAPACITY`
    /// Default: 100
    pub capacity: usize,

    /// Maximum number of sources with history (0 = unlimited)
    ///
    /// With 0 every distinct source id keeps its ring until the process
    /// exits, so deployments with unbounded source churn should set a limit.
    /// Default: 0
    pub max_sources: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: 100,
            max_sources: 0,
        }
    }
}
