//! The normalized envelope
//!
//! `Envelope` is immutable: fields are private and every transformation
//! (`with_tag`, `with_origin`) returns a new value. `RawEnvelope` is the
//! unvalidated shape a transport decoder produces; `validate()` turns it
//! into an `Envelope` or reports which required field is missing.

use std::collections::HashMap;

use bytes::Bytes;

use crate::error::{EnvelopeError, Result};
use crate::payload::{HttpStartStop, LogMessage, Payload, PayloadKind};
use crate::source::SourceId;

/// One normalized telemetry event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    source_id: SourceId,
    timestamp: i64,
    origin: String,
    payload: Payload,
    tags: HashMap<String, String>,
}

impl Envelope {
    /// Start building an envelope from its required fields
    pub fn builder(
        source_id: impl Into<SourceId>,
        timestamp: i64,
        payload: impl Into<Payload>,
    ) -> EnvelopeBuilder {
        EnvelopeBuilder {
            source_id: source_id.into(),
            timestamp,
            origin: String::new(),
            payload: payload.into(),
            tags: HashMap::new(),
        }
    }

    /// Shorthand for a stdout log envelope
    pub fn log(
        source_id: impl Into<SourceId>,
        timestamp: i64,
        message: impl Into<Bytes>,
    ) -> Result<Self> {
        Self::builder(source_id, timestamp, LogMessage::out(message)).build()
    }

    #[inline]
    pub fn source_id(&self) -> &SourceId {
        &self.source_id
    }

    /// Nanosecond timestamp assigned by the producer
    #[inline]
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Producer identity (empty if the producer did not set one)
    #[inline]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    #[inline]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    #[inline]
    pub fn payload_kind(&self) -> PayloadKind {
        self.payload.kind()
    }

    pub fn tags(&self) -> &HashMap<String, String> {
        &self.tags
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// The log payload, if this is a log envelope
    pub fn as_log(&self) -> Option<&LogMessage> {
        match &self.payload {
            Payload::Log(log) => Some(log),
            Payload::HttpStartStop(_) => None,
        }
    }

    /// The HTTP payload, if this is an HttpStartStop envelope
    pub fn as_http(&self) -> Option<&HttpStartStop> {
        match &self.payload {
            Payload::HttpStartStop(http) => Some(http),
            Payload::Log(_) => None,
        }
    }

    /// Copy of this envelope with one tag added or replaced
    pub fn with_tag(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.tags.insert(key.into(), value.into());
        next
    }

    /// Copy of this envelope with a different origin
    pub fn with_origin(&self, origin: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.origin = origin.into();
        next
    }
}

/// Builder for [`Envelope`]
#[derive(Debug, Clone)]
pub struct EnvelopeBuilder {
    source_id: SourceId,
    timestamp: i64,
    origin: String,
    payload: Payload,
    tags: HashMap<String, String>,
}

impl EnvelopeBuilder {
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn tags<I, K, V>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.tags
            .extend(tags.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Finish the envelope
    ///
    /// # Errors
    ///
    /// Returns `EnvelopeError::Malformed` if the source id is empty.
    pub fn build(self) -> Result<Envelope> {
        if self.source_id.is_empty() {
            return Err(EnvelopeError::malformed("source_id"));
        }

        Ok(Envelope {
            source_id: self.source_id,
            timestamp: self.timestamp,
            origin: self.origin,
            payload: self.payload,
            tags: self.tags,
        })
    }
}

/// Envelope as decoded by a transport, before validation
///
/// Every field is optional because wire formats do not guarantee presence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEnvelope {
    pub source_id: Option<String>,
    pub timestamp: Option<i64>,
    pub origin: Option<String>,
    pub payload: Option<Payload>,
    pub tags: HashMap<String, String>,
}

impl RawEnvelope {
    /// Check required fields and produce an [`Envelope`]
    ///
    /// # Errors
    ///
    /// Returns `EnvelopeError::Malformed` naming the first missing field.
    pub fn validate(self) -> Result<Envelope> {
        let source_id = self
            .source_id
            .filter(|s| !s.is_empty())
            .ok_or_else(|| EnvelopeError::malformed("source_id"))?;
        let timestamp = self
            .timestamp
            .ok_or_else(|| EnvelopeError::malformed("timestamp"))?;
        let payload = self
            .payload
            .ok_or_else(|| EnvelopeError::malformed("payload"))?;

        Envelope::builder(source_id, timestamp, payload)
            .origin(self.origin.unwrap_or_default())
            .tags(self.tags)
            .build()
    }
}

impl TryFrom<RawEnvelope> for Envelope {
    type Error = EnvelopeError;

    fn try_from(raw: RawEnvelope) -> Result<Self> {
        raw.validate()
    }
}

#[cfg(test)]
#[path = "envelope_test.rs"]
mod tests;
