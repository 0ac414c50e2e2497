//! Firehose History - bounded recent history per source
//!
//! Serves the "recent logs" read path: every ingested envelope is appended
//! under its source id, the oldest envelope is evicted once a source holds
//! `capacity` envelopes, and queries return a snapshot in arrival order.
//!
//! ```
//! use std::sync::Arc;
//! use firehose_envelope::Envelope;
//! use firehose_history::HistoryStore;
//!
//! let store = HistoryStore::with_capacity(1).unwrap();
//! store.append(Arc::new(Envelope::log("A", 100, "hello").unwrap())).unwrap();
//! store.append(Arc::new(Envelope::log("A", 200, "world").unwrap())).unwrap();
//!
//! let recent = store.query("A");
//! assert_eq!(recent.len(), 1);
//! assert_eq!(recent[0].timestamp(), 200);
//! assert!(store.query("unknown").is_empty());
//! ```

mod error;
mod ring;
mod store;

pub use error::{HistoryError, Result};
pub use store::{DEFAULT_CAPACITY, HistoryStore, MAX_CAPACITY};
