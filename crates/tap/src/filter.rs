//! Envelope filter for stream subscriptions
//!
//! `StreamFilter` matches on envelope metadata only (source id, payload
//! kind, origin). The payload itself is never inspected.
//!
//! # Filter Logic
//!
//! - All filters are optional (None = match all)
//! - Multiple values in a filter are OR'd (match any)
//! - Different filters are AND'd (must match all specified filters)
//!
//! # Example
//!
//! ```
//! use firehose_tap::StreamFilter;
//! use firehose_envelope::PayloadKind;
//!
//! // Logs from app-1 only
//! let filter = StreamFilter::new()
//!     .with_source("app-1")
//!     .with_kinds(vec![PayloadKind::Log]);
//! ```

use std::collections::HashSet;

use firehose_envelope::{Envelope, PayloadKind, SourceId};

/// Metadata-only filter for envelope matching
///
/// All checks are HashSet lookups on fields already present on the envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamFilter {
    /// Source IDs to match (None = match all)
    source_ids: Option<HashSet<SourceId>>,
    /// Payload kinds to match (None = match all)
    kinds: Option<HashSet<PayloadKind>>,
    /// Origins to match (None = match all)
    origins: Option<HashSet<String>>,
}

impl StreamFilter {
    /// Create an empty filter (matches everything, i.e. the firehose)
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter for a single source (the per-app stream)
    pub fn for_source(source_id: impl Into<SourceId>) -> Self {
        Self::new().with_source(source_id)
    }

    /// Add a single source to the source filter
    pub fn with_source(mut self, source_id: impl Into<SourceId>) -> Self {
        self.source_ids
            .get_or_insert_with(HashSet::new)
            .insert(source_id.into());
        self
    }

    /// Replace the source filter
    pub fn with_sources(mut self, ids: Vec<SourceId>) -> Self {
        self.source_ids = Some(ids.into_iter().collect());
        self
    }

    /// Replace the payload kind filter
    pub fn with_kinds(mut self, kinds: Vec<PayloadKind>) -> Self {
        self.kinds = Some(kinds.into_iter().collect());
        self
    }

    /// Replace the origin filter
    pub fn with_origins<S: Into<String>>(mut self, origins: Vec<S>) -> Self {
        self.origins = Some(origins.into_iter().map(Into::into).collect());
        self
    }

    /// Check if filter is empty (matches everything)
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.source_ids.is_none() && self.kinds.is_none() && self.origins.is_none()
    }

    /// Check if an envelope matches this filter
    ///
    /// This runs once per subscriber per broadcast, under the registry
    /// read lock.
    #[inline]
    pub fn matches(&self, envelope: &Envelope) -> bool {
        if self.is_empty() {
            return true;
        }

        if let Some(ref ids) = self.source_ids
            && !ids.contains(envelope.source_id())
        {
            return false;
        }

        if let Some(ref kinds) = self.kinds
            && !kinds.contains(&envelope.payload_kind())
        {
            return false;
        }

        if let Some(ref origins) = self.origins
            && !origins.contains(envelope.origin())
        {
            return false;
        }

        true
    }

    /// Get source filter (for debugging/logging)
    pub fn source_ids(&self) -> Option<&HashSet<SourceId>> {
        self.source_ids.as_ref()
    }

    /// Get payload kind filter (for debugging/logging)
    pub fn kinds(&self) -> Option<&HashSet<PayloadKind>> {
        self.kinds.as_ref()
    }

    /// Get origin filter (for debugging/logging)
    pub fn origins(&self) -> Option<&HashSet<String>> {
        self.origins.as_ref()
    }
}

#[cfg(test)]
#[path = "filter_test.rs"]
mod tests;
