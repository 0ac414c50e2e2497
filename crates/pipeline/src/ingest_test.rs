//! Tests for the Ingestor

use std::collections::HashMap;
use std::time::Duration;

use super::*;
use firehose_envelope::{EnvelopeError, HttpStartStop, LogMessage, Method, Payload, PeerType};
use firehose_history::HistoryError;
use firehose_tap::TapError;

const WAIT: Duration = Duration::from_millis(100);

fn log_env(source_id: &str, ts: i64, message: &str) -> Envelope {
    Envelope::log(source_id, ts, message.to_string()).unwrap()
}

fn http_env(source_id: &str, origin: &str) -> Envelope {
    let http = HttpStartStop::new(Method::Head, PeerType::Server, 418, 10, 20)
        .with_user_agent("Spider-Man");
    Envelope::builder(source_id, 20, http)
        .origin(origin)
        .build()
        .unwrap()
}

fn raw(source_id: Option<&str>, timestamp: Option<i64>) -> RawEnvelope {
    RawEnvelope {
        source_id: source_id.map(str::to_string),
        timestamp,
        origin: None,
        payload: Some(Payload::Log(LogMessage::out("raw"))),
        tags: HashMap::new(),
    }
}

fn ingestor(history_capacity: usize, queue_capacity: usize) -> Ingestor {
    Ingestor::from_config(&IngestorConfig {
        history_capacity,
        max_sources: 0,
        router: RouterConfig {
            queue_capacity,
            ..Default::default()
        },
    })
    .unwrap()
}

// ============================================================================
// Writes
// ============================================================================

#[tokio::test]
async fn test_ingest_stores_and_broadcasts() {
    let ingestor = Ingestor::from_config(&IngestorConfig::default()).unwrap();
    let mut sub = ingestor.stream("A").unwrap();

    let report = ingestor.ingest(log_env("A", 1, "hello")).unwrap();
    assert_eq!(
        report,
        IngestReport {
            stored: true,
            delivered: 1
        }
    );

    assert_eq!(ingestor.recent("A").len(), 1);
    let streamed = sub.next_timeout(WAIT).await.unwrap().unwrap();
    assert_eq!(streamed.as_log().unwrap().text(), "hello");
}

#[test]
fn test_history_and_stream_share_one_envelope() {
    let ingestor = ingestor(10, 10);
    let mut sub = ingestor.firehose().unwrap();

    ingestor.ingest(log_env("A", 1, "x")).unwrap();

    let stored = &ingestor.recent("A")[0];
    let streamed = sub.try_next().unwrap();
    assert!(Arc::ptr_eq(stored, &streamed));
}

#[test]
fn test_ingest_without_subscribers_still_stores() {
    let ingestor = ingestor(10, 10);

    let report = ingestor.ingest(log_env("A", 1, "x")).unwrap();
    assert!(report.stored);
    assert_eq!(report.delivered, 0);
    assert_eq!(ingestor.snapshot().undelivered, 1);
}

#[test]
fn test_capacity_one_history_scenario() {
    let ingestor = ingestor(1, 10);

    ingestor.ingest(log_env("A", 100, "hello")).unwrap();
    ingestor.ingest(log_env("A", 200, "world")).unwrap();

    let recent = ingestor.recent("A");
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].timestamp(), 200);
    assert_eq!(recent[0].as_log().unwrap().text(), "world");
}

#[test]
fn test_recent_unknown_source_is_empty() {
    let ingestor = ingestor(10, 10);
    assert!(ingestor.recent("nobody").is_empty());
    assert!(ingestor.recent_logs("nobody").is_empty());
}

#[test]
fn test_recent_logs_excludes_http() {
    let ingestor = ingestor(10, 10);

    ingestor.ingest(log_env("A", 1, "first")).unwrap();
    ingestor.ingest(http_env("A", "router")).unwrap();
    ingestor.ingest(log_env("A", 3, "second")).unwrap();

    assert_eq!(ingestor.recent("A").len(), 3);
    let logs: Vec<i64> = ingestor
        .recent_logs("A")
        .iter()
        .map(|e| e.timestamp())
        .collect();
    assert_eq!(logs, vec![1, 3]);
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_ingest_raw_valid() {
    let ingestor = ingestor(10, 10);
    let report = ingestor.ingest_raw(raw(Some("A"), Some(1))).unwrap();
    assert!(report.stored);
    assert_eq!(ingestor.recent("A").len(), 1);
}

#[test]
fn test_malformed_rejected_before_any_write() {
    let ingestor = ingestor(10, 10);
    let mut sub = ingestor.firehose().unwrap();

    let err = ingestor.ingest_raw(raw(Some("A"), None)).unwrap_err();
    assert!(err.is_malformed());
    assert!(matches!(
        err,
        PipelineError::Envelope(EnvelopeError::Malformed { field: "timestamp" })
    ));

    assert!(ingestor.recent("A").is_empty());
    assert!(sub.try_next().is_none());

    let s = ingestor.snapshot();
    assert_eq!(s.received, 1);
    assert_eq!(s.malformed, 1);
    assert_eq!(s.stored, 0);
}

#[test]
fn test_malformed_does_not_affect_other_sources() {
    let ingestor = ingestor(10, 10);
    let mut sub_b = ingestor.stream("B").unwrap();

    ingestor.ingest(log_env("B", 1, "before")).unwrap();
    assert!(ingestor.ingest_raw(raw(None, Some(2))).is_err());
    ingestor.ingest(log_env("B", 3, "after")).unwrap();

    let history: Vec<i64> = ingestor.recent("B").iter().map(|e| e.timestamp()).collect();
    assert_eq!(history, vec![1, 3]);
    assert_eq!(sub_b.drain().len(), 2);
    assert_eq!(ingestor.history().source_count(), 1);
    assert_eq!(ingestor.router().subscriber_count(), 1);
}

// ============================================================================
// History failure
// ============================================================================

#[test]
fn test_history_failure_still_broadcasts() {
    let ingestor = Ingestor::from_config(&IngestorConfig {
        max_sources: 1,
        ..Default::default()
    })
    .unwrap();
    let mut sub = ingestor.firehose().unwrap();

    ingestor.ingest(log_env("A", 1, "tracked")).unwrap();
    let err = ingestor.ingest(log_env("B", 2, "untracked")).unwrap_err();

    match err {
        PipelineError::History { source, delivered } => {
            assert!(matches!(source, HistoryError::SourceLimit { max: 1, .. }));
            assert_eq!(delivered, 1);
        }
        other => panic!("unexpected error: {other}"),
    }

    // Live path unaffected
    let streamed: Vec<String> = sub
        .drain()
        .iter()
        .map(|e| e.source_id().to_string())
        .collect();
    assert_eq!(streamed, vec!["A", "B"]);
    assert!(ingestor.recent("B").is_empty());
    assert_eq!(ingestor.snapshot().history_failures, 1);
}

// ============================================================================
// Streaming
// ============================================================================

#[tokio::test]
async fn test_stream_filter_skips_other_sources() {
    let ingestor = ingestor(10, 10);
    let mut sub = ingestor.stream("A").unwrap();

    ingestor.ingest(log_env("B", 1, "not for A")).unwrap();

    let result = sub.next_timeout(WAIT).await;
    assert!(matches!(result, Err(TapError::Timeout { .. })));
}

#[tokio::test]
async fn test_firehose_finds_http_by_origin() {
    let ingestor = ingestor(10, 10);
    let mut sub = ingestor
        .subscribe(StreamFilter::new().with_origins(vec!["lats-42"]))
        .unwrap();

    ingestor.ingest(http_env("app-1", "someone-else")).unwrap();
    ingestor.ingest(http_env("app-1", "lats-42")).unwrap();

    let env = sub.next_timeout(WAIT).await.unwrap().unwrap();
    assert_eq!(env.origin(), "lats-42");
    let http = env.as_http().unwrap();
    assert_eq!(http.method, Method::Head);
    assert_eq!(http.peer_type, PeerType::Server);
    assert_eq!(http.status_code, 418);
    assert_eq!(http.user_agent, "Spider-Man");
}

#[test]
fn test_slow_subscriber_does_not_block_ingest() {
    let ingestor = ingestor(100, 2);
    let slow = ingestor.firehose().unwrap();

    for ts in 0..50 {
        ingestor.ingest(log_env("A", ts, "x")).unwrap();
    }

    assert_eq!(slow.dropped(), 48);
    assert_eq!(ingestor.recent("A").len(), 50);
}

#[test]
fn test_unsubscribe_via_ingestor() {
    let ingestor = ingestor(10, 10);
    let sub = ingestor.firehose().unwrap();

    assert!(ingestor.unsubscribe(sub.id()));
    assert!(!ingestor.unsubscribe(sub.id()));
}

#[test]
fn test_invalid_router_config() {
    let err = Ingestor::from_config(&IngestorConfig {
        router: RouterConfig {
            queue_capacity: 0,
            ..Default::default()
        },
        ..Default::default()
    })
    .unwrap_err();
    assert!(matches!(err, PipelineError::Tap(TapError::InvalidConfig(_))));
}

#[test]
fn test_history_capacity_above_max_rejected() {
    let err = Ingestor::from_config(&IngestorConfig {
        history_capacity: 150_000,
        ..Default::default()
    })
    .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::InvalidHistory(HistoryError::InvalidCapacity {
            capacity: 150_000,
            ..
        })
    ));
}

#[test]
fn test_history_capacity_at_max_retains_all() {
    let ingestor = ingestor(firehose_history::MAX_CAPACITY, 10);
    for ts in 0..firehose_history::MAX_CAPACITY as i64 {
        ingestor.ingest(log_env("A", ts, "x")).unwrap();
    }
    assert_eq!(ingestor.recent("A").len(), firehose_history::MAX_CAPACITY);
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_producers_and_consumers() {
    let ingestor = Arc::new(ingestor(1000, 5000));
    let mut per_source = Vec::new();
    for source in ["A", "B", "C"] {
        per_source.push(ingestor.stream(source).unwrap());
    }

    let mut producers = Vec::new();
    for source in ["A", "B", "C"] {
        let ingestor = Arc::clone(&ingestor);
        producers.push(tokio::spawn(async move {
            for ts in 0..500 {
                ingestor.ingest(log_env(source, ts, "x")).unwrap();
            }
        }));
    }

    let mut consumers = Vec::new();
    for mut sub in per_source {
        consumers.push(tokio::spawn(async move {
            let mut seen = Vec::new();
            while seen.len() < 500 {
                match sub.next_timeout(Duration::from_secs(5)).await {
                    Ok(Some(env)) => seen.push(env.timestamp()),
                    _ => break,
                }
            }
            seen
        }));
    }

    for producer in producers {
        producer.await.unwrap();
    }
    for consumer in consumers {
        let seen = consumer.await.unwrap();
        assert_eq!(seen, (0..500).collect::<Vec<i64>>());
    }

    for source in ["A", "B", "C"] {
        assert_eq!(ingestor.recent(source).len(), 500);
    }
    assert_eq!(ingestor.snapshot().stored, 1500);
}
