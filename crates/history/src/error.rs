//! Error types for the history store

use thiserror::Error;

/// Errors that can occur when building or appending to history
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    /// A new source appeared but the store already tracks the maximum
    #[error("history source limit reached ({max}), not tracking '{source_id}'")]
    SourceLimit { max: usize, source_id: String },

    /// Per-source capacity outside `1..=max`
    #[error("history capacity {capacity} out of range (1..={max})")]
    InvalidCapacity { capacity: usize, max: usize },
}

/// Result type for history operations
pub type Result<T> = std::result::Result<T, HistoryError>;
