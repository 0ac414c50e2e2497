//! Pipeline error types
//!
//! Error types for the ingestion endpoint.

use thiserror::Error;

use firehose_envelope::EnvelopeError;
use firehose_history::HistoryError;
use firehose_tap::TapError;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Envelope failed validation; nothing was stored or broadcast
    #[error("rejected envelope: {0}")]
    Envelope(#[from] EnvelopeError),

    /// History append failed; the envelope was still broadcast
    #[error("history append failed (delivered to {delivered} subscriptions): {source}")]
    History {
        #[source]
        source: HistoryError,
        delivered: usize,
    },

    /// History store could not be built from configuration
    #[error("invalid history configuration: {0}")]
    InvalidHistory(#[source] HistoryError),

    /// Subscription could not be opened
    #[error(transparent)]
    Tap(#[from] TapError),
}

impl PipelineError {
    /// True if the envelope was rejected before any write
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::Envelope(EnvelopeError::Malformed { .. }))
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;
