//! Logging configuration
//!
//! Controls what the firehose binary logs and how. The result is rendered
//! as a `tracing_subscriber::EnvFilter` directive string.

use std::collections::BTreeMap;

use serde::Deserialize;

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Per-envelope detail
    Trace,
    /// Subscription lifecycle, rejected envelopes
    Debug,
    #[default]
    Info,
    /// Evictions, history failures
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines (default)
    #[default]
    Console,
    /// One JSON object per event
    Json,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Console => "console",
            Self::Json => "json",
        }
    }
}

/// Logging configuration
///
/// # Example
///
/// ```toml
/// [log]
/// level = "info"
/// format = "json"
///
/// [log.targets]
/// firehose_tap = "debug"
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    /// Default level for every target
    pub level: LogLevel,

    pub format: LogFormat,

    /// Per-target overrides, keyed by module path (e.g. `firehose_tap`)
    pub targets: BTreeMap<String, LogLevel>,
}

impl LogConfig {
    /// Render an `EnvFilter` directive string
    ///
    /// `level_override` replaces the default level (the CLI flag) but keeps
    /// the per-target overrides.
    pub fn directives(&self, level_override: Option<&str>) -> String {
        let mut out = level_override.unwrap_or(self.level.as_str()).to_string();
        for (target, level) in &self.targets {
            out.push(',');
            out.push_str(target);
            out.push('=');
            out.push_str(level.as_str());
        }
        out
    }
}

/// True if `target` is a plain module path usable in a directive
pub(crate) fn is_valid_target(target: &str) -> bool {
    !target.is_empty()
        && target
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
}
