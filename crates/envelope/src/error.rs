//! Error types for envelope construction

use thiserror::Error;

/// Errors raised while building an [`Envelope`](crate::Envelope)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeError {
    /// A required field was missing or empty
    #[error("malformed envelope: missing {field}")]
    Malformed { field: &'static str },

    /// An enumerated field carried an unknown name
    #[error("unknown {kind}: {value}")]
    UnknownVariant { kind: &'static str, value: String },
}

impl EnvelopeError {
    /// Create a Malformed error
    pub fn malformed(field: &'static str) -> Self {
        Self::Malformed { field }
    }
}

/// Result type for envelope operations
pub type Result<T> = std::result::Result<T, EnvelopeError>;
