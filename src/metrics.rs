//! Prometheus instrumentation.
//!
//! Command metrics (duration, totals, in-flight) plus scraper counters
//! for messages scanned, forward sources found and per-outcome logging
//! results. The `/metrics` endpoint is opt-in via `--metrics-addr`;
//! process metrics come from the default `process` collector.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use once_cell::sync::Lazy;
use prometheus::process_collector::ProcessCollector;
use prometheus::{
    default_registry, register_histogram_vec, register_int_counter_vec, register_int_gauge_vec,
    Encoder, HistogramVec, IntCounterVec, IntGaugeVec, TextEncoder,
};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

static PROCESS_COLLECTOR: Lazy<()> = Lazy::new(|| {
    if let Err(err) = default_registry().register(Box::new(ProcessCollector::for_self())) {
        warn!("Process collector not registered: {}", err);
    }
});

static COMMAND_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    // Exponential buckets from 50ms up to ~30 minutes; logging a full
    // channel history can take a while.
    let buckets =
        prometheus::exponential_buckets(0.05, 2.0, 16).expect("bucket layout is valid");
    register_histogram_vec!(
        "forward_tracker_command_duration_seconds",
        "Wall-clock command duration in seconds",
        &["command"],
        buckets
    )
    .expect("command duration histogram registration")
});

static COMMAND_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "forward_tracker_command_total",
        "Commands executed, labelled by exit status",
        &["command", "status"]
    )
    .expect("command totals registration")
});

static COMMAND_INFLIGHT: Lazy<IntGaugeVec> = Lazy::new(|| {
    register_int_gauge_vec!(
        "forward_tracker_command_inflight",
        "Commands currently executing",
        &["command"]
    )
    .expect("in-flight gauge registration")
});

static MESSAGES_SCANNED: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "forward_tracker_messages_scanned_total",
        "Messages fetched from channel histories",
        &["channel"]
    )
    .expect("scanned counter registration")
});

static FORWARD_SOURCES: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "forward_tracker_forward_sources_total",
        "Channel-forward headers seen while scanning",
        &["channel"]
    )
    .expect("forward counter registration")
});

static CHANNEL_LOGS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "forward_tracker_channel_logs_total",
        "Per-channel logging outcomes",
        &["outcome"]
    )
    .expect("log outcome counter registration")
});

fn ensure_registered() {
    Lazy::force(&PROCESS_COLLECTOR);
    Lazy::force(&COMMAND_DURATION);
    Lazy::force(&COMMAND_TOTAL);
    Lazy::force(&COMMAND_INFLIGHT);
    Lazy::force(&MESSAGES_SCANNED);
    Lazy::force(&FORWARD_SOURCES);
    Lazy::force(&CHANNEL_LOGS);
}

/// Mark a command as started.
pub fn record_command_start(command: &'static str) {
    ensure_registered();
    COMMAND_INFLIGHT.with_label_values(&[command]).inc();
}

/// Mark a command as finished, with its duration and status.
pub fn record_command_result(command: &'static str, duration: Duration, success: bool) {
    ensure_registered();
    COMMAND_INFLIGHT.with_label_values(&[command]).dec();
    COMMAND_DURATION
        .with_label_values(&[command])
        .observe(duration.as_secs_f64());
    COMMAND_TOTAL
        .with_label_values(&[command, if success { "ok" } else { "error" }])
        .inc();
}

/// Count a finished history scan over one channel.
pub fn record_channel_scan(channel_id: i64, messages: usize, forwards: usize) {
    ensure_registered();
    let channel = channel_id.to_string();
    MESSAGES_SCANNED
        .with_label_values(&[&channel])
        .inc_by(messages as u64);
    FORWARD_SOURCES
        .with_label_values(&[&channel])
        .inc_by(forwards as u64);
}

/// Count one logging outcome ("written", "kept" or "unreachable").
pub fn record_log_outcome(outcome: &'static str) {
    ensure_registered();
    CHANNEL_LOGS.with_label_values(&[outcome]).inc();
}

async fn render_metrics() -> Result<Response<Full<Bytes>>, Infallible> {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();

    match encoder.encode(&prometheus::gather(), &mut buffer) {
        Ok(()) => Ok(Response::builder()
            .status(StatusCode::OK)
            .header(hyper::header::CONTENT_TYPE, encoder.format_type())
            .body(Full::from(buffer))
            .unwrap()),
        Err(err) => {
            error!("Failed to encode metrics: {}", err);
            Ok(Response::builder()
                .status(StatusCode::INTERNAL_SERVER_ERROR)
                .body(Full::from("encode error"))
                .unwrap())
        }
    }
}

async fn route(req: Request<Incoming>) -> Result<Response<Full<Bytes>>, Infallible> {
    match req.uri().path() {
        "/metrics" => render_metrics().await,
        _ => Ok(Response::builder()
            .status(StatusCode::NOT_FOUND)
            .body(Full::new(Bytes::new()))
            .unwrap()),
    }
}

async fn serve(addr: SocketAddr) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "Serving Prometheus metrics");

    loop {
        let (stream, peer) = listener.accept().await?;
        let io = TokioIo::new(stream);

        tokio::spawn(async move {
            let served = http1::Builder::new()
                .serve_connection(io, service_fn(route))
                .await;
            if let Err(err) = served {
                warn!(?peer, "Metrics connection error: {}", err);
            }
        });
    }
}

/// Start the metrics endpoint in the background.
pub fn spawn_metrics_server(addr: SocketAddr) {
    ensure_registered();
    tokio::spawn(async move {
        if let Err(err) = serve(addr).await {
            error!(%addr, "Metrics server failed: {}", err);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn metrics_text() -> String {
        let response = render_metrics().await.expect("metrics response");
        assert_eq!(response.status(), StatusCode::OK);
        let body = response
            .into_body()
            .collect()
            .await
            .expect("collect metrics body")
            .to_bytes();
        String::from_utf8(body.to_vec()).expect("utf-8 metrics body")
    }

    #[test]
    fn command_lifecycle_updates_all_three_families() {
        let cmd = "test_lifecycle";

        record_command_start(cmd);
        assert_eq!(COMMAND_INFLIGHT.with_label_values(&[cmd]).get(), 1);

        record_command_result(cmd, Duration::from_millis(120), true);

        assert_eq!(COMMAND_INFLIGHT.with_label_values(&[cmd]).get(), 0);
        assert_eq!(COMMAND_TOTAL.with_label_values(&[cmd, "ok"]).get(), 1);
        assert_eq!(
            COMMAND_DURATION.with_label_values(&[cmd]).get_sample_count(),
            1
        );
    }

    #[test]
    fn failures_count_under_the_error_status() {
        let cmd = "test_failure_status";

        record_command_start(cmd);
        record_command_result(cmd, Duration::from_secs(2), false);

        assert_eq!(COMMAND_TOTAL.with_label_values(&[cmd, "error"]).get(), 1);
        assert_eq!(COMMAND_TOTAL.with_label_values(&[cmd, "ok"]).get(), 0);
    }

    #[test]
    fn channel_scans_accumulate_per_channel() {
        record_channel_scan(424242, 100, 7);
        record_channel_scan(424242, 50, 3);

        assert_eq!(
            MESSAGES_SCANNED.with_label_values(&["424242"]).get(),
            150
        );
        assert_eq!(FORWARD_SOURCES.with_label_values(&["424242"]).get(), 10);
    }

    #[test]
    fn log_outcomes_count_by_label() {
        record_log_outcome("written");
        record_log_outcome("written");
        record_log_outcome("unreachable");

        assert_eq!(CHANNEL_LOGS.with_label_values(&["written"]).get(), 2);
        assert_eq!(CHANNEL_LOGS.with_label_values(&["unreachable"]).get(), 1);
    }

    #[test]
    fn ensure_registered_is_idempotent() {
        ensure_registered();
        ensure_registered();
        ensure_registered();
        // Should not panic
    }

    #[tokio::test]
    async fn endpoint_exposes_tracker_families() {
        record_command_start("test_endpoint");
        record_command_result("test_endpoint", Duration::from_millis(10), true);
        record_channel_scan(515151, 5, 1);

        let text = metrics_text().await;
        assert!(text.contains("forward_tracker_command_total"));
        assert!(text.contains("forward_tracker_command_duration_seconds"));
        assert!(text.contains("forward_tracker_messages_scanned_total"));
        assert!(text.contains("515151"));
    }

    #[tokio::test]
    async fn endpoint_sets_text_content_type() {
        let response = render_metrics().await.expect("metrics response");

        let content_type = response
            .headers()
            .get(hyper::header::CONTENT_TYPE)
            .expect("content type header");
        assert!(content_type.to_str().unwrap().contains("text/"));
    }
}
