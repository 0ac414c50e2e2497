//! Source identification types
//!
//! `SourceId` identifies the application or component that emitted an
//! envelope. It is the partition key for recent history and stream filters.

use std::borrow::Borrow;
use std::fmt;

/// Source identifier (application instance, component name, ...)
///
/// # Example
///
/// ```
/// use firehose_envelope::SourceId;
///
/// let source = SourceId::new("app-1");
/// assert_eq!(source.as_str(), "app-1");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(String);

impl SourceId {
    /// Create a new source ID
    #[inline]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the source ID as a string slice
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if the ID is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for SourceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for SourceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Lets `HashMap<SourceId, _>` be queried with a plain `&str`.
impl Borrow<str> for SourceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}
