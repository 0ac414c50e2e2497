//! Error types for the tap crate

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur in the fan-out system
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TapError {
    /// Maximum subscribers reached
    #[error("maximum subscribers reached ({max})")]
    MaxSubscribers { max: usize },

    /// No envelope arrived before the deadline
    #[error("subscription {id} timed out after {waited:?}")]
    Timeout { id: u64, waited: Duration },

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for tap operations
pub type Result<T> = std::result::Result<T, TapError>;
