//! Firehose Tap - live fan-out to stream subscribers
//!
//! This crate delivers every ingested envelope to any number of open
//! subscriptions without letting a slow consumer hold up ingestion:
//!
//! - Filters on metadata only (source_id, payload kind, origin)
//! - Bounded per-subscription queues; a full queue drops the new envelope
//!   for that subscription only and counts the drop
//! - Optional eviction of subscriptions that keep overflowing
//! - Closing a subscription stops new deliveries but keeps queued ones
//! - Near-zero cost when no subscribers are connected
//!
//! # Architecture
//!
//! ```text
//! Ingestor.ingest()
//!     │
//!     ├──→ Arc::new(envelope)
//!     │         │
//!     │    ┌────┴────┐
//!     │    ▼         ▼
//!     │  History   Router ◄── registry (RwLock), metadata filters
//!     │              │
//!     │              ▼  try_send (never blocks)
//!     │         per-subscription mpsc queues
//!     │              │
//!     │              ▼
//!     └──→      Subscription::next() ──→ consumers
//! ```

mod error;
pub mod filter;
pub mod router;
pub mod subscriber;
pub mod subscription;

pub use error::{Result, TapError};
pub use filter::StreamFilter;
pub use router::{Router, RouterConfig, RouterStats};
pub use subscriber::{BroadcastOutcome, Subscriber, SubscriberManager};
pub use subscription::Subscription;
