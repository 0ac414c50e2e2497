//! Envelope payloads
//!
//! An envelope carries exactly one payload: a log line or an HTTP
//! start/stop record. `PayloadKind` is the bare variant tag, which is what
//! stream filters match on.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;

use crate::error::EnvelopeError;

/// Log stream a message was written to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MessageType {
    /// Standard output
    #[default]
    Out,
    /// Standard error
    Err,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Out => "OUT",
            MessageType::Err => "ERR",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageType {
    type Err = EnvelopeError;

    fn from_str(s: &str) -> Result<Self, EnvelopeError> {
        match s.to_ascii_uppercase().as_str() {
            "OUT" => Ok(MessageType::Out),
            "ERR" => Ok(MessageType::Err),
            _ => Err(EnvelopeError::UnknownVariant {
                kind: "message type",
                value: s.to_string(),
            }),
        }
    }
}

/// A single log line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogMessage {
    /// Raw message bytes (not necessarily UTF-8)
    pub message: Bytes,
    /// Output stream
    pub message_type: MessageType,
}

impl LogMessage {
    /// Create a log message written to stdout
    pub fn out(message: impl Into<Bytes>) -> Self {
        Self {
            message: message.into(),
            message_type: MessageType::Out,
        }
    }

    /// Create a log message written to stderr
    pub fn err(message: impl Into<Bytes>) -> Self {
        Self {
            message: message.into(),
            message_type: MessageType::Err,
        }
    }

    /// Message as text, replacing invalid UTF-8
    pub fn text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.message)
    }
}

/// HTTP request method
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Patch,
    Options,
    Connect,
    Trace,
    /// Any method outside the common set
    Other(String),
}

impl Method {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Patch => "PATCH",
            Self::Options => "OPTIONS",
            Self::Connect => "CONNECT",
            Self::Trace => "TRACE",
            Self::Other(s) => s,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = EnvelopeError;

    fn from_str(s: &str) -> Result<Self, EnvelopeError> {
        if s.is_empty() {
            return Err(EnvelopeError::malformed("http method"));
        }
        Ok(match s.to_ascii_uppercase().as_str() {
            "GET" => Self::Get,
            "POST" => Self::Post,
            "PUT" => Self::Put,
            "DELETE" => Self::Delete,
            "HEAD" => Self::Head,
            "PATCH" => Self::Patch,
            "OPTIONS" => Self::Options,
            "CONNECT" => Self::Connect,
            "TRACE" => Self::Trace,
            other => Self::Other(other.to_string()),
        })
    }
}

/// Which side of the request the emitter was on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeerType {
    Client,
    Server,
}

impl PeerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Client => "Client",
            Self::Server => "Server",
        }
    }
}

impl fmt::Display for PeerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PeerType {
    type Err = EnvelopeError;

    fn from_str(s: &str) -> Result<Self, EnvelopeError> {
        match s.to_ascii_lowercase().as_str() {
            "client" => Ok(Self::Client),
            "server" => Ok(Self::Server),
            _ => Err(EnvelopeError::UnknownVariant {
                kind: "peer type",
                value: s.to_string(),
            }),
        }
    }
}

/// One completed HTTP request, as seen by an instrumented handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpStartStop {
    pub method: Method,
    pub peer_type: PeerType,
    pub status_code: u16,
    pub user_agent: String,
    /// Request start, unix nanoseconds
    pub start_timestamp: i64,
    /// Request end, unix nanoseconds
    pub stop_timestamp: i64,
    pub uri: String,
    pub remote_address: String,
    pub content_length: i64,
    /// Correlation id, if the emitter assigned one
    pub request_id: Option<String>,
}

impl HttpStartStop {
    /// Create a record with the required fields; the rest start empty
    pub fn new(
        method: Method,
        peer_type: PeerType,
        status_code: u16,
        start_timestamp: i64,
        stop_timestamp: i64,
    ) -> Self {
        Self {
            method,
            peer_type,
            status_code,
            user_agent: String::new(),
            start_timestamp,
            stop_timestamp,
            uri: String::new(),
            remote_address: String::new(),
            content_length: 0,
            request_id: None,
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = uri.into();
        self
    }

    pub fn with_remote_address(mut self, addr: impl Into<String>) -> Self {
        self.remote_address = addr.into();
        self
    }

    pub fn with_content_length(mut self, len: i64) -> Self {
        self.content_length = len;
        self
    }

    pub fn with_request_id(mut self, id: impl Into<String>) -> Self {
        self.request_id = Some(id.into());
        self
    }

    /// Request duration in nanoseconds (zero if the clock went backwards)
    pub fn duration_nanos(&self) -> i64 {
        (self.stop_timestamp - self.start_timestamp).max(0)
    }
}

/// Envelope payload: exactly one variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    Log(LogMessage),
    HttpStartStop(HttpStartStop),
}

impl Payload {
    /// The variant tag of this payload
    #[inline]
    pub fn kind(&self) -> PayloadKind {
        match self {
            Self::Log(_) => PayloadKind::Log,
            Self::HttpStartStop(_) => PayloadKind::HttpStartStop,
        }
    }
}

impl From<LogMessage> for Payload {
    fn from(log: LogMessage) -> Self {
        Self::Log(log)
    }
}

impl From<HttpStartStop> for Payload {
    fn from(http: HttpStartStop) -> Self {
        Self::HttpStartStop(http)
    }
}

/// Payload variant tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PayloadKind {
    Log,
    HttpStartStop,
}

impl PayloadKind {
    /// All kinds, in declaration order
    pub const ALL: [PayloadKind; 2] = [PayloadKind::Log, PayloadKind::HttpStartStop];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Log => "log",
            Self::HttpStartStop => "http_start_stop",
        }
    }
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PayloadKind {
    type Err = EnvelopeError;

    fn from_str(s: &str) -> Result<Self, EnvelopeError> {
        match s.to_ascii_lowercase().as_str() {
            "log" | "logs" => Ok(Self::Log),
            "http_start_stop" | "httpstartstop" | "http" => Ok(Self::HttpStartStop),
            _ => Err(EnvelopeError::UnknownVariant {
                kind: "payload kind",
                value: s.to_string(),
            }),
        }
    }
}
