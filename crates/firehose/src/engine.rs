//! Engine assembly from configuration

use std::sync::Arc;

use anyhow::{Context, Result};
use firehose_config::Config;
use firehose_pipeline::{Ingestor, IngestorConfig, RouterConfig};
use tokio::task::JoinHandle;
use tracing::info;

/// Map the file configuration onto ingestor sizing
pub fn ingestor_config(config: &Config) -> IngestorConfig {
    IngestorConfig {
        history_capacity: config.history.capacity,
        max_sources: config.history.max_sources,
        router: RouterConfig {
            queue_capacity: config.stream.queue_capacity,
            max_subscribers: config.stream.max_subscribers,
            max_consecutive_drops: config.stream.max_consecutive_drops,
        },
    }
}

/// A running ingestor plus its background maintenance task
pub struct Engine {
    pub ingestor: Arc<Ingestor>,
    maintenance: JoinHandle<()>,
}

impl Engine {
    /// Build the ingestor and start subscription cleanup
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(config: &Config) -> Result<Self> {
        let ingestor = Ingestor::from_config(&ingestor_config(config))
            .context("failed to build ingestor")?;
        let ingestor = Arc::new(ingestor);

        let maintenance = ingestor
            .router()
            .spawn_maintenance(config.stream.cleanup_interval());

        info!(
            history_capacity = config.history.capacity,
            queue_capacity = config.stream.queue_capacity,
            max_subscribers = config.stream.max_subscribers,
            "engine started"
        );

        Ok(Self {
            ingestor,
            maintenance,
        })
    }

    pub fn shutdown(self) {
        self.maintenance.abort();
        let snapshot = self.ingestor.snapshot();
        info!(
            received = snapshot.received,
            stored = snapshot.stored,
            malformed = snapshot.malformed,
            deliveries = snapshot.deliveries,
            "engine stopped"
        );
    }
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
