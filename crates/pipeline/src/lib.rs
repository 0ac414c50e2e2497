//! Firehose Pipeline - the ingestion endpoint
//!
//! Accepts decoded envelopes from any transport and writes each one twice:
//! into the per-source recent-history store and out to live subscriptions.
//!
//! # Architecture
//!
//! ```text
//! [Transports]                 [Ingestor]                      [Readers]
//!   v1 ──┐                                        ┌──→ HistoryStore ──→ recent / recent_logs
//!   v2 ──┼──→ RawEnvelope ──→ validate ──→ Arc ───┤
//!   app ─┘                                        └──→ Router ──→ Subscription (stream / firehose)
//! ```
//!
//! # Key Design
//!
//! - **Reject early**: malformed envelopes never reach history or subscribers
//! - **One allocation**: history and every subscription share the same `Arc<Envelope>`
//! - **Broadcast always runs**: a history failure is reported after fan-out
//! - **Non-blocking**: slow subscribers drop envelopes, ingest never waits
//!
//! # Example
//!
//! ```
//! use firehose_pipeline::{Ingestor, IngestorConfig};
//! use firehose_envelope::Envelope;
//!
//! let ingestor = Ingestor::from_config(&IngestorConfig::default()).unwrap();
//! let mut stream = ingestor.stream("app-1").unwrap();
//!
//! ingestor.ingest(Envelope::log("app-1", 1, "hello").unwrap()).unwrap();
//!
//! assert_eq!(ingestor.recent_logs("app-1").len(), 1);
//! assert!(stream.try_next().is_some());
//! ```

mod error;
mod ingest;
mod metrics;

pub use error::{PipelineError, Result};
pub use ingest::{IngestReport, Ingestor, IngestorConfig};
pub use metrics::{IngestMetrics, IngestSnapshot};

// Re-export key types from dependencies for convenience
pub use firehose_envelope::{Envelope, RawEnvelope, SourceId};
pub use firehose_history::HistoryStore;
pub use firehose_tap::{Router, RouterConfig, StreamFilter, Subscription};
