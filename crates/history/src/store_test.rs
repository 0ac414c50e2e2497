//! Tests for HistoryStore

use super::*;

fn log(source_id: &str, ts: i64, message: &str) -> Arc<Envelope> {
    Arc::new(Envelope::log(source_id, ts, message.to_string()).unwrap())
}

fn timestamps(envelopes: &[Arc<Envelope>]) -> Vec<i64> {
    envelopes.iter().map(|e| e.timestamp()).collect()
}

// ============================================================================
// Basic operations
// ============================================================================

#[test]
fn test_new_store_is_empty() {
    let store = HistoryStore::new();
    assert!(store.is_empty());
    assert_eq!(store.source_count(), 0);
    assert_eq!(store.capacity(), DEFAULT_CAPACITY);
    assert_eq!(store.total_appended(), 0);
}

#[test]
fn test_query_unknown_source_is_empty() {
    let store = HistoryStore::new();
    assert!(store.query("nobody").is_empty());
    assert_eq!(store.len("nobody"), 0);
    assert_eq!(store.total_written("nobody"), 0);
}

#[test]
fn test_append_then_query_in_arrival_order() {
    let store = HistoryStore::new();

    store.append(log("A", 300, "c")).unwrap();
    store.append(log("A", 100, "a")).unwrap();
    store.append(log("A", 200, "b")).unwrap();

    // Arrival order, not timestamp order
    assert_eq!(timestamps(&store.query("A")), vec![300, 100, 200]);
    assert_eq!(store.len("A"), 3);
}

#[test]
fn test_no_deduplication() {
    let store = HistoryStore::new();
    let env = log("A", 1, "same");

    store.append(Arc::clone(&env)).unwrap();
    store.append(env).unwrap();

    assert_eq!(store.len("A"), 2);
}

// ============================================================================
// Eviction
// ============================================================================

#[test]
fn test_capacity_one_keeps_latest() {
    let store = HistoryStore::with_capacity(1).unwrap();

    store.append(log("A", 100, "hello")).unwrap();
    store.append(log("A", 200, "world")).unwrap();

    let result = store.query("A");
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].timestamp(), 200);
    assert_eq!(result[0].as_log().unwrap().text(), "world");
}

#[test]
fn test_returns_last_capacity_envelopes() {
    let store = HistoryStore::with_capacity(5).unwrap();

    for ts in 0..23 {
        store.append(log("A", ts, "x")).unwrap();
    }

    assert_eq!(timestamps(&store.query("A")), vec![18, 19, 20, 21, 22]);
    assert_eq!(store.total_written("A"), 23);
}

#[test]
fn test_exactly_full_ring() {
    let store = HistoryStore::with_capacity(3).unwrap();

    for ts in 0..3 {
        store.append(log("A", ts, "x")).unwrap();
    }

    assert_eq!(timestamps(&store.query("A")), vec![0, 1, 2]);
}

#[test]
fn test_zero_capacity_rejected() {
    let err = HistoryStore::with_capacity(0).unwrap_err();
    assert_eq!(
        err,
        HistoryError::InvalidCapacity {
            capacity: 0,
            max: MAX_CAPACITY
        }
    );
}

#[test]
fn test_capacity_above_max_rejected() {
    let err = HistoryStore::with_limits(150_000, 0).unwrap_err();
    assert_eq!(
        err,
        HistoryError::InvalidCapacity {
            capacity: 150_000,
            max: MAX_CAPACITY
        }
    );
    assert!(err.to_string().contains("150000"));
}

#[test]
fn test_max_capacity_keeps_every_envelope() {
    let store = HistoryStore::with_capacity(MAX_CAPACITY).unwrap();
    assert_eq!(store.capacity(), MAX_CAPACITY);

    for ts in 0..MAX_CAPACITY as i64 + 5 {
        store.append(log("A", ts, "x")).unwrap();
    }
    let recent = store.query("A");
    assert_eq!(recent.len(), MAX_CAPACITY);
    assert_eq!(recent[0].timestamp(), 5);
}

#[test]
fn test_last_n() {
    let store = HistoryStore::with_capacity(4).unwrap();
    for ts in 0..6 {
        store.append(log("A", ts, "x")).unwrap();
    }

    assert_eq!(timestamps(&store.last_n("A", 2)), vec![4, 5]);
    assert_eq!(timestamps(&store.last_n("A", 10)), vec![2, 3, 4, 5]);
    assert!(store.last_n("A", 0).is_empty());
    assert!(store.last_n("B", 3).is_empty());
}

// ============================================================================
// Source isolation
// ============================================================================

#[test]
fn test_sources_are_independent() {
    let store = HistoryStore::with_capacity(2).unwrap();

    store.append(log("A", 1, "a1")).unwrap();
    store.append(log("B", 2, "b1")).unwrap();
    store.append(log("A", 3, "a2")).unwrap();
    store.append(log("A", 4, "a3")).unwrap();

    assert_eq!(timestamps(&store.query("A")), vec![3, 4]);
    assert_eq!(timestamps(&store.query("B")), vec![2]);
    assert_eq!(store.sources(), vec![SourceId::new("A"), SourceId::new("B")]);
    assert_eq!(store.total_appended(), 4);
}

#[test]
fn test_source_limit_rejects_new_sources_only() {
    let store = HistoryStore::with_limits(10, 1).unwrap();

    store.append(log("A", 1, "x")).unwrap();
    let err = store.append(log("B", 2, "y")).unwrap_err();
    assert_eq!(
        err,
        HistoryError::SourceLimit {
            max: 1,
            source_id: "B".into()
        }
    );

    // Existing source still accepted
    store.append(log("A", 3, "z")).unwrap();
    assert_eq!(store.len("A"), 2);
    assert!(store.query("B").is_empty());
}

#[test]
fn test_unlimited_sources_keep_every_id() {
    let store = HistoryStore::new();
    for i in 0..500 {
        store.append(log(&format!("app-{i}"), i, "x")).unwrap();
    }
    assert_eq!(store.source_count(), 500);
}

#[test]
fn test_source_limit_bounds_registry() {
    let store = HistoryStore::with_limits(10, 50).unwrap();
    let mut rejected = 0;
    for i in 0..500 {
        if store.append(log(&format!("app-{i}"), i, "x")).is_err() {
            rejected += 1;
        }
    }
    assert_eq!(store.source_count(), 50);
    assert_eq!(rejected, 450);
}

#[test]
fn test_clear() {
    let store = HistoryStore::new();
    store.append(log("A", 1, "x")).unwrap();
    store.clear();

    assert!(store.is_empty());
    assert!(store.query("A").is_empty());
}

// ============================================================================
// Concurrency
// ============================================================================

#[test]
fn test_concurrent_appends_per_source_ordered() {
    let store = HistoryStore::with_capacity(1000).unwrap();

    std::thread::scope(|s| {
        for source in ["A", "B", "C", "D"] {
            let store = &store;
            s.spawn(move || {
                for ts in 0..500 {
                    store.append(log(source, ts, "x")).unwrap();
                }
            });
        }
    });

    assert_eq!(store.source_count(), 4);
    assert_eq!(store.total_appended(), 2000);
    for source in ["A", "B", "C", "D"] {
        let expected: Vec<i64> = (0..500).collect();
        assert_eq!(timestamps(&store.query(source)), expected);
    }
}
