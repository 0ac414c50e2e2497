//! Configuration validation
//!
//! Validates value ranges that serde cannot express:
//! - History capacity is within 1..=MAX_HISTORY_CAPACITY
//! - Stream queue capacity and subscriber limit are at least 1
//! - Cleanup interval is at least one second
//! - Log target overrides name plain module paths

use crate::Config;
use crate::error::{ConfigError, Result};
use crate::history::MAX_HISTORY_CAPACITY;
use crate::logging::is_valid_target;

/// Validate the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_log(config)?;
    validate_history(config)?;
    validate_stream(config)?;
    Ok(())
}

fn validate_log(config: &Config) -> Result<()> {
    if let Some(target) = config.log.targets.keys().find(|t| !is_valid_target(t)) {
        return Err(ConfigError::invalid_value(
            "log",
            "targets",
            format!("'{target}' is not a module path"),
        ));
    }
    Ok(())
}

fn validate_history(config: &Config) -> Result<()> {
    if config.history.capacity == 0 {
        return Err(ConfigError::invalid_value(
            "history",
            "capacity",
            "must be at least 1",
        ));
    }

    if config.history.capacity > MAX_HISTORY_CAPACITY {
        return Err(ConfigError::invalid_value(
            "history",
            "capacity",
            format!("must be at most {MAX_HISTORY_CAPACITY}"),
        ));
    }

    Ok(())
}

fn validate_stream(config: &Config) -> Result<()> {
    let stream = &config.stream;

    if stream.queue_capacity == 0 {
        return Err(ConfigError::invalid_value(
            "stream",
            "queue_capacity",
            "must be at least 1",
        ));
    }

    if stream.max_subscribers == 0 {
        return Err(ConfigError::invalid_value(
            "stream",
            "max_subscribers",
            "must be at least 1",
        ));
    }

    if stream.cleanup_interval_secs == 0 {
        return Err(ConfigError::invalid_value(
            "stream",
            "cleanup_interval_secs",
            "must be at least 1",
        ));
    }

    Ok(())
}
