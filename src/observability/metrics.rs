//! Metrics collection and exposition.
//!
//! # Metrics
//! - `html_storage_file_compression_duration_seconds` (summary): per-call compression time
//! - `precompressor_raw_bytes_total` / `precompressor_compressed_bytes_total` (counter)
//! - `precompressor_requests_total` (counter): requests by route, status
//! - `precompressor_request_duration_seconds` (summary): handler latency by route
//! - `precompressor_relay_total` (counter): downstream relays by kind, outcome
//! - `precompressor_background_tasks` (gauge): detached relays in flight

use std::sync::OnceLock;
use std::time::{Duration, Instant};

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

pub const COMPRESSION_DURATION: &str = "html_storage_file_compression_duration_seconds";
pub const RAW_BYTES: &str = "precompressor_raw_bytes_total";
pub const COMPRESSED_BYTES: &str = "precompressor_compressed_bytes_total";
pub const REQUESTS_TOTAL: &str = "precompressor_requests_total";
pub const REQUEST_DURATION: &str = "precompressor_request_duration_seconds";
pub const RELAY_TOTAL: &str = "precompressor_relay_total";
pub const BACKGROUND_TASKS: &str = "precompressor_background_tasks";

const QUANTILES: [f64; 3] = [0.5, 0.9, 0.99];

/// How often recorded samples are folded into the summaries.
pub const UPKEEP_INTERVAL: Duration = Duration::from_secs(5);

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the Prometheus recorder (first call only) and return a render handle.
pub fn init_metrics() -> PrometheusHandle {
    HANDLE
        .get_or_init(|| {
            let builder = PrometheusBuilder::new()
                .set_quantiles(&QUANTILES)
                .unwrap_or_else(|e| {
                    tracing::warn!(error = %e, "Invalid quantiles, using exporter defaults");
                    PrometheusBuilder::new()
                });
            let recorder = builder.build_recorder();
            let handle = recorder.handle();

            if let Err(e) = metrics::set_global_recorder(recorder) {
                tracing::warn!(error = %e, "Global metrics recorder already set");
            }
            describe();
            handle
        })
        .clone()
}

/// Run recorder upkeep every `period` until the task is aborted.
///
/// Histogram samples otherwise accumulate until the next scrape.
pub fn spawn_upkeep(handle: PrometheusHandle, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            handle.run_upkeep();
        }
    })
}

fn describe() {
    describe_histogram!(COMPRESSION_DURATION, Unit::Seconds, "Duration of file compression operations");
    describe_counter!(RAW_BYTES, Unit::Bytes, "HTML bytes received for compression");
    describe_counter!(COMPRESSED_BYTES, Unit::Bytes, "Compressed bytes produced");
    describe_counter!(REQUESTS_TOTAL, "Inbound requests by route and status");
    describe_histogram!(REQUEST_DURATION, Unit::Seconds, "Inbound request handling time");
    describe_counter!(RELAY_TOTAL, "Downstream relays by kind and outcome");
    describe_gauge!(BACKGROUND_TASKS, "Detached single-item relays in flight");
}

/// Record one compression call.
pub fn record_compression(raw_len: usize, compressed_len: usize, start: Instant) {
    histogram!(COMPRESSION_DURATION).record(start.elapsed().as_secs_f64());
    counter!(RAW_BYTES).increment(raw_len as u64);
    counter!(COMPRESSED_BYTES).increment(compressed_len as u64);
}

/// Record a handled inbound request.
pub fn record_request(route: &str, status: u16, start: Instant) {
    counter!(REQUESTS_TOTAL, "route" => route.to_owned(), "status" => status.to_string()).increment(1);
    histogram!(REQUEST_DURATION, "route" => route.to_owned()).record(start.elapsed().as_secs_f64());
}

/// Record the outcome of a downstream relay.
pub fn record_relay(kind: &'static str, outcome: &'static str) {
    counter!(RELAY_TOTAL, "kind" => kind, "outcome" => outcome).increment(1);
}

pub fn background_task_started() {
    gauge!(BACKGROUND_TASKS).increment(1.0);
}

pub fn background_task_finished() {
    gauge!(BACKGROUND_TASKS).decrement(1.0);
}
