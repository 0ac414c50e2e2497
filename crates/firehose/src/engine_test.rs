//! Tests for engine assembly

use super::*;
use std::str::FromStr;

#[test]
fn test_ingestor_config_mapping() {
    let config = Config::from_str(
        r#"
[history]
capacity = 3
max_sources = 10

[stream]
queue_capacity = 4
max_subscribers = 5
max_consecutive_drops = 6
"#,
    )
    .unwrap();

    let mapped = ingestor_config(&config);
    assert_eq!(mapped.history_capacity, 3);
    assert_eq!(mapped.max_sources, 10);
    assert_eq!(mapped.router.queue_capacity, 4);
    assert_eq!(mapped.router.max_subscribers, 5);
    assert_eq!(mapped.router.max_consecutive_drops, 6);
}

#[test]
fn test_default_config_maps_to_default_ingestor() {
    assert_eq!(ingestor_config(&Config::default()), IngestorConfig::default());
}

#[tokio::test]
async fn test_engine_start_and_shutdown() {
    let engine = Engine::start(&Config::default()).unwrap();

    let env = firehose_envelope::Envelope::log("app-1", 1, "hello").unwrap();
    engine.ingestor.ingest(env).unwrap();
    assert_eq!(engine.ingestor.recent("app-1").len(), 1);

    engine.shutdown();
}

#[tokio::test]
async fn test_largest_valid_history_capacity_starts() {
    let config = Config::from_str(&format!(
        "[history]\ncapacity = {}",
        firehose_config::MAX_HISTORY_CAPACITY
    ))
    .unwrap();

    let engine = Engine::start(&config).unwrap();
    assert_eq!(
        engine.ingestor.history().capacity(),
        firehose_config::MAX_HISTORY_CAPACITY
    );
    engine.shutdown();
}
