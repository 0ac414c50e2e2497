//! Ingestor - the single entry point for decoded envelopes
//!
//! Every accepted envelope is wrapped in one `Arc` and written twice:
//! appended to the recent-history store under its source id, then broadcast
//! to live subscriptions. A history failure never prevents the broadcast.

use std::sync::Arc;

use tracing::{debug, trace};

use firehose_envelope::{Envelope, PayloadKind, RawEnvelope};
use firehose_history::HistoryStore;
use firehose_tap::{Router, RouterConfig, StreamFilter, Subscription};

use crate::error::{PipelineError, Result};
use crate::metrics::{FailureLogger, IngestMetrics, IngestSnapshot};

/// Sizing for an [`Ingestor`] built from scratch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestorConfig {
    /// Envelopes retained per source
    pub history_capacity: usize,
    /// Maximum sources with history (0 = unlimited)
    pub max_sources: usize,
    /// Live fan-out settings
    pub router: RouterConfig,
}

impl Default for IngestorConfig {
    fn default() -> Self {
        Self {
            history_capacity: firehose_history::DEFAULT_CAPACITY,
            max_sources: 0,
            router: RouterConfig::default(),
        }
    }
}

/// What happened to one accepted envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestReport {
    /// Appended to recent history
    pub stored: bool,
    /// Subscriptions it was enqueued on
    pub delivered: usize,
}

/// Ingestion endpoint: validates, stores, and fans out envelopes
#[derive(Debug)]
pub struct Ingestor {
    history: Arc<HistoryStore>,
    router: Arc<Router>,
    metrics: Arc<IngestMetrics>,
    history_failures: FailureLogger,
}

impl Ingestor {
    /// Create an ingestor over existing components
    pub fn new(history: Arc<HistoryStore>, router: Arc<Router>) -> Self {
        Self {
            history,
            router,
            metrics: Arc::new(IngestMetrics::new()),
            history_failures: FailureLogger::new(),
        }
    }

    /// Build the history store and router from configuration
    ///
    /// # Errors
    ///
    /// - `PipelineError::InvalidHistory` if the history capacity is out of
    ///   range.
    /// - `PipelineError::Tap` if the router configuration is invalid.
    pub fn from_config(config: &IngestorConfig) -> Result<Self> {
        let history = HistoryStore::with_limits(config.history_capacity, config.max_sources)
            .map_err(PipelineError::InvalidHistory)?;
        let router = Router::with_config(&config.router)?;
        Ok(Self::new(Arc::new(history), Arc::new(router)))
    }

    /// Validate a transport-decoded envelope, then ingest it
    ///
    /// # Errors
    ///
    /// - `PipelineError::Envelope` if a required field is missing; nothing
    ///   is stored or broadcast.
    /// - `PipelineError::History` if the history append failed; the
    ///   envelope was still broadcast.
    pub fn ingest_raw(&self, raw: RawEnvelope) -> Result<IngestReport> {
        self.metrics.record_received();

        let envelope = raw.validate().map_err(|e| {
            self.metrics.record_malformed();
            debug!(error = %e, "rejected malformed envelope");
            PipelineError::from(e)
        })?;

        self.write(Arc::new(envelope))
    }

    /// Ingest an already-validated envelope
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::History` if the history append failed; the
    /// envelope was still broadcast.
    pub fn ingest(&self, envelope: Envelope) -> Result<IngestReport> {
        self.ingest_shared(Arc::new(envelope))
    }

    /// Ingest an envelope that is already shared
    pub fn ingest_shared(&self, envelope: Arc<Envelope>) -> Result<IngestReport> {
        self.metrics.record_received();
        self.write(envelope)
    }

    fn write(&self, envelope: Arc<Envelope>) -> Result<IngestReport> {
        let stored = self.history.append(Arc::clone(&envelope));

        let delivered = self.router.broadcast(Arc::clone(&envelope));
        self.metrics.record_delivered(delivered);

        match stored {
            Ok(()) => {
                self.metrics.record_stored();
                trace!(source = %envelope.source_id(), delivered, "ingested envelope");
                Ok(IngestReport {
                    stored: true,
                    delivered,
                })
            }
            Err(source) => {
                self.metrics.record_history_failure();
                self.history_failures.record(&source);
                Err(PipelineError::History { source, delivered })
            }
        }
    }

    /// Every retained envelope for a source, oldest first
    ///
    /// Unknown sources return an empty vec.
    pub fn recent(&self, source_id: &str) -> Vec<Arc<Envelope>> {
        self.history.query(source_id)
    }

    /// Retained log envelopes for a source, oldest first
    pub fn recent_logs(&self, source_id: &str) -> Vec<Arc<Envelope>> {
        let mut envelopes = self.history.query(source_id);
        envelopes.retain(|e| e.payload_kind() == PayloadKind::Log);
        envelopes
    }

    /// Open a live subscription
    pub fn subscribe(&self, filter: StreamFilter) -> Result<Subscription> {
        Ok(self.router.subscribe(filter)?)
    }

    /// Subscribe to everything (the firehose)
    pub fn firehose(&self) -> Result<Subscription> {
        self.subscribe(StreamFilter::new())
    }

    /// Subscribe to a single source (the per-app stream)
    pub fn stream(&self, source_id: &str) -> Result<Subscription> {
        self.subscribe(StreamFilter::for_source(source_id))
    }

    /// Close a live subscription by ID
    pub fn unsubscribe(&self, id: u64) -> bool {
        self.router.unsubscribe(id)
    }

    pub fn history(&self) -> &Arc<HistoryStore> {
        &self.history
    }

    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    /// Shared handle to the ingest counters
    pub fn metrics(&self) -> Arc<IngestMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Current ingest counters
    pub fn snapshot(&self) -> IngestSnapshot {
        self.metrics.snapshot()
    }
}

#[cfg(test)]
#[path = "ingest_test.rs"]
mod tests;
