//! Ingest benchmark suite
//!
//! Benchmarks for the ingestion hot path: history append plus fan-out.
//!
//! Run with: `cargo bench -p firehose-pipeline`

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use firehose_pipeline::{Envelope, Ingestor, IngestorConfig, RouterConfig, StreamFilter};

fn make_log(source_id: &str, ts: i64) -> Envelope {
    Envelope::log(source_id, ts, "benchmark log line with some additional data").unwrap()
}

fn ingestor() -> Ingestor {
    Ingestor::from_config(&IngestorConfig {
        router: RouterConfig {
            queue_capacity: 1024,
            max_subscribers: 10_000,
            ..Default::default()
        },
        ..Default::default()
    })
    .unwrap()
}

/// History append only, no subscribers (fast path)
fn bench_ingest_no_subscribers(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingest_no_subscribers");
    group.throughput(Throughput::Elements(1));

    for sources in [1, 100, 10_000] {
        group.bench_with_input(
            BenchmarkId::from_parameter(sources),
            &sources,
            |b, &sources| {
                let ingestor = ingestor();
                let ids: Vec<String> = (0..sources).map(|i| format!("app-{i}")).collect();
                let mut i = 0usize;
                b.iter(|| {
                    let env = make_log(&ids[i % ids.len()], i as i64);
                    i += 1;
                    black_box(ingestor.ingest(env).unwrap())
                });
            },
        );
    }
    group.finish();
}

/// Fan-out to N firehose subscribers whose queues are drained each batch
fn bench_ingest_fanout(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingest_fanout");
    group.throughput(Throughput::Elements(1));

    for subscribers in [1, 10, 100] {
        group.bench_with_input(
            BenchmarkId::from_parameter(subscribers),
            &subscribers,
            |b, &n| {
                let ingestor = ingestor();
                let mut subs: Vec<_> = (0..n).map(|_| ingestor.firehose().unwrap()).collect();
                let mut ts = 0i64;
                b.iter(|| {
                    ts += 1;
                    let report = ingestor.ingest(make_log("app-1", ts)).unwrap();
                    if ts % 512 == 0 {
                        for sub in &mut subs {
                            sub.drain();
                        }
                    }
                    black_box(report)
                });
            },
        );
    }
    group.finish();
}

/// Fan-out where only one of many per-source subscriptions matches
fn bench_ingest_filtered(c: &mut Criterion) {
    let mut group = c.benchmark_group("ingest_filtered");
    group.throughput(Throughput::Elements(1));

    for subscribers in [10, 100, 1000] {
        group.bench_with_input(
            BenchmarkId::from_parameter(subscribers),
            &subscribers,
            |b, &n| {
                let ingestor = ingestor();
                let mut subs: Vec<_> = (0..n)
                    .map(|i| {
                        ingestor
                            .subscribe(StreamFilter::for_source(format!("app-{i}")))
                            .unwrap()
                    })
                    .collect();
                let mut ts = 0i64;
                b.iter(|| {
                    ts += 1;
                    let report = ingestor.ingest(make_log("app-0", ts)).unwrap();
                    if ts % 512 == 0 {
                        subs[0].drain();
                    }
                    black_box(report)
                });
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_ingest_no_subscribers,
    bench_ingest_fanout,
    bench_ingest_filtered,
);
criterion_main!(benches);
