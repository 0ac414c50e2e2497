//! Smoke command - replay ingestion scenarios against an in-process engine
//!
//! Each scenario emits envelopes through the ingestor and reads them back
//! the way a consumer would: from recent history, from a per-app stream, or
//! from the firehose.
//!
//! # Usage
//!
//! ```bash
//! firehose smoke
//! firehose smoke --timeout-ms 500 --quiet
//! ```

use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result, bail, ensure};
use clap::Args;
use firehose_config::Config;
use firehose_envelope::{Envelope, HttpStartStop, Method, PayloadKind, PeerType};
use firehose_pipeline::Ingestor;
use firehose_tap::Subscription;
use tracing::{error, info};

use crate::engine::Engine;

/// Origin prefix for envelopes emitted by the smoke run
const ORIGIN_NAME: &str = "firehose-smoke";

#[derive(Args, Debug)]
pub struct SmokeArgs {
    /// How long each scenario waits for its envelope
    #[arg(short, long, default_value = "2000")]
    timeout_ms: u64,

    /// Quiet mode - only print failures
    #[arg(short, long)]
    quiet: bool,
}

pub async fn run(args: SmokeArgs, config: &Config) -> Result<()> {
    let engine = Engine::start(config)?;
    let timeout = Duration::from_millis(args.timeout_ms);

    let results = run_scenarios(&engine.ingestor, timeout).await;
    engine.shutdown();

    let mut failed = 0;
    for (name, result) in &results {
        match result {
            Ok(()) => {
                info!(scenario = name, "passed");
                if !args.quiet {
                    println!("  [PASS] {name}");
                }
            }
            Err(e) => {
                failed += 1;
                error!(scenario = name, error = %e, "failed");
                println!("  [FAIL] {name}: {e:#}");
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} smoke scenarios failed", results.len());
    }
    if !args.quiet {
        println!("\nDone. {} scenarios passed.", results.len());
    }
    Ok(())
}

/// Run every scenario in order, collecting each outcome
pub async fn run_scenarios(
    ingestor: &Arc<Ingestor>,
    timeout: Duration,
) -> Vec<(&'static str, Result<()>)> {
    vec![
        ("recent logs", recent_logs(ingestor)),
        ("log stream by app", log_stream(ingestor, timeout).await),
        ("http on firehose by origin", http_firehose(ingestor, timeout).await),
        ("http stream by app", http_stream(ingestor, timeout).await),
    ]
}

/// A log emitted for a fresh app shows up in its recent logs
///
/// History is written inside `ingest`, so one query is enough.
fn recent_logs(ingestor: &Ingestor) -> Result<()> {
    let app_id = rand_app_id();
    let env = Envelope::log(app_id.as_str(), now_nanos(), "Recent log message")?;
    let expected = env.as_log().cloned();
    ingestor.ingest(env)?;

    let found = ingestor
        .recent_logs(&app_id)
        .iter()
        .any(|e| e.as_log().cloned() == expected);
    ensure!(found, "log for {app_id} not in recent logs");
    Ok(())
}

/// A log emitted for an app reaches a stream opened for that app
async fn log_stream(ingestor: &Ingestor, timeout: Duration) -> Result<()> {
    let app_id = rand_app_id();
    let mut stream = ingestor.stream(&app_id)?;

    let env = Envelope::log(app_id.as_str(), now_nanos(), "Stream message")?;
    let expected = env.as_log().cloned();
    ingestor.ingest(env)?;

    let received = find_matching(&mut stream, timeout, |e| e.source_id().as_str() == app_id)
        .await
        .with_context(|| format!("no stream envelope for {app_id}"))?;
    ensure!(received.as_log().cloned() == expected, "log payload differs");
    Ok(())
}

/// An HttpStartStop with a unique origin is found on the firehose
async fn http_firehose(ingestor: &Ingestor, timeout: Duration) -> Result<()> {
    let mut firehose = ingestor.firehose()?;
    let origin = format!("{ORIGIN_NAME}-{}", now_nanos());

    ingestor.ingest(http_envelope(&rand_app_id(), &origin, "Spider-Man")?)?;

    let received = find_matching(&mut firehose, timeout, |e| e.origin() == origin)
        .await
        .with_context(|| format!("no firehose envelope with origin {origin}"))?;
    check_http(&received, "Spider-Man")
}

/// An HttpStartStop for an app reaches a stream opened for that app
async fn http_stream(ingestor: &Ingestor, timeout: Duration) -> Result<()> {
    let app_id = rand_app_id();
    let mut stream = ingestor.stream(&app_id)?;

    ingestor.ingest(http_envelope(&app_id, ORIGIN_NAME, "Superman")?)?;

    let received = find_matching(&mut stream, timeout, |e| {
        e.payload_kind() == PayloadKind::HttpStartStop
    })
    .await
    .with_context(|| format!("no http envelope on stream for {app_id}"))?;
    ensure!(received.source_id().as_str() == app_id, "wrong source id");
    check_http(&received, "Superman")
}

fn http_envelope(app_id: &str, origin: &str, user_agent: &str) -> Result<Envelope> {
    let start = now_nanos();
    let stop = now_nanos().max(start + 1);
    let http = HttpStartStop::new(Method::Head, PeerType::Server, 418, start, stop)
        .with_user_agent(user_agent)
        .with_uri("/");
    Ok(Envelope::builder(app_id, stop, http).origin(origin).build()?)
}

fn check_http(env: &Envelope, user_agent: &str) -> Result<()> {
    let http = env.as_http().context("not an HttpStartStop envelope")?;
    ensure!(http.peer_type == PeerType::Server, "peer type {}", http.peer_type);
    ensure!(http.method == Method::Head, "method {}", http.method);
    ensure!(http.start_timestamp != 0, "zero start timestamp");
    ensure!(http.stop_timestamp != 0, "zero stop timestamp");
    ensure!(http.user_agent == user_agent, "user agent {}", http.user_agent);
    ensure!(http.status_code == 418, "status code {}", http.status_code);
    Ok(())
}

/// Read from a subscription until an envelope matches or the deadline passes
async fn find_matching<F>(
    sub: &mut Subscription,
    timeout: Duration,
    predicate: F,
) -> Result<Arc<Envelope>>
where
    F: Fn(&Envelope) -> bool,
{
    let deadline = Instant::now() + timeout;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match sub.next_timeout(remaining).await? {
            Some(env) if predicate(&*env) => return Ok(env),
            Some(_) => continue,
            None => bail!("subscription {} ended", sub.id()),
        }
    }
}

fn rand_app_id() -> String {
    format!("app-{:016x}", rand::random::<u64>())
}

fn now_nanos() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as i64)
        .unwrap_or(1)
}

#[cfg(test)]
#[path = "smoke_test.rs"]
mod tests;
