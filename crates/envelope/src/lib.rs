//! Firehose Envelope - normalized telemetry events
//!
//! The envelope model is independent of any wire encoding. Transports decode
//! their frames into a [`RawEnvelope`] and call [`RawEnvelope::validate`];
//! in-process producers use [`Envelope::builder`].
//!
//! # Example
//!
//! ```
//! use firehose_envelope::{Envelope, HttpStartStop, Method, PayloadKind, PeerType};
//!
//! let http = HttpStartStop::new(Method::Head, PeerType::Server, 418, 10, 20)
//!     .with_user_agent("Superman");
//! let env = Envelope::builder("app-1", 20, http)
//!     .origin("router")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(env.payload_kind(), PayloadKind::HttpStartStop);
//! ```

mod envelope;
mod error;
mod payload;
mod source;

pub use envelope::{Envelope, EnvelopeBuilder, RawEnvelope};
pub use error::{EnvelopeError, Result};
pub use payload::{
    HttpStartStop, LogMessage, MessageType, Method, Payload, PayloadKind, PeerType,
};
pub use source::SourceId;
