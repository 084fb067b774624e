//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the Showrunner server:
//! - HTTP request metrics (latency, counts, errors)
//! - Scheduler status (collected dynamically)
//! - Core metrics (dispatches, webhooks, uploads, publishes)

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "showrunner_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("showrunner_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "showrunner_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Scheduler Metrics (collected dynamically)
// =============================================================================

/// Scheduler running state (1 = running, 0 = stopped).
pub static SCHEDULER_RUNNING: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "showrunner_scheduler_running",
        "Whether the scheduler is running (1) or stopped (0)",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();
    registry
        .register(Box::new(SCHEDULER_RUNNING.clone()))
        .unwrap();

    // Core metrics (dispatches, webhooks, uploads, publishes)
    for metric in showrunner_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

/// Collect dynamic metrics from current application state.
///
/// Called before encoding so that gauges reflect the current state.
pub fn collect_dynamic_metrics(state: &crate::state::AppState) {
    SCHEDULER_RUNNING.set(if state.scheduler().is_running() { 1 } else { 0 });
}

/// Normalize a path for metric labels (replace IDs with placeholders).
///
/// Run and artifact ids live in the segment after their collection
/// name; everything else passes through untouched.
pub fn normalize_path(path: &str) -> String {
    let mut segments: Vec<String> = path.split('/').map(str::to_string).collect();
    for i in 1..segments.len() {
        if matches!(segments[i - 1].as_str(), "runs" | "artifacts") && !segments[i].is_empty() {
            segments[i] = "{id}".to_string();
        }
    }
    segments.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_run_id() {
        let path = "/api/v1/runs/run_3f2a9c1b8d7e4f60a1b2c3d4e5f60718";
        assert_eq!(normalize_path(path), "/api/v1/runs/{id}");
    }

    #[test]
    fn test_normalize_path_artifact_id() {
        let path = "/api/v1/artifacts/vid_a1b2c3";
        assert_eq!(normalize_path(path), "/api/v1/artifacts/{id}");
    }

    #[test]
    fn test_normalize_path_no_ids() {
        let path = "/api/v1/health";
        assert_eq!(normalize_path(path), "/api/v1/health");
    }

    #[test]
    fn test_normalize_path_collection_without_id() {
        let path = "/api/v1/runs";
        assert_eq!(normalize_path(path), "/api/v1/runs");
    }

    #[test]
    fn test_encode_metrics_returns_prometheus_format() {
        // Access metrics to ensure they're initialized
        HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/test", "200"])
            .inc();

        let output = encode_metrics();
        assert!(output.contains("showrunner_http_requests_total"));
        assert!(output.contains("# HELP"));
        assert!(output.contains("# TYPE"));
    }

    #[test]
    fn test_registry_contains_core_metrics() {
        // Prometheus only outputs metrics that have been accessed
        showrunner_core::metrics::DISPATCHES_TOTAL
            .with_label_values(&["main", "success"])
            .inc();
        showrunner_core::metrics::WEBHOOKS_RECEIVED
            .with_label_values(&["progress"])
            .inc();
        SCHEDULER_RUNNING.set(0);

        let output = encode_metrics();
        assert!(output.contains("showrunner_dispatches_total"));
        assert!(output.contains("showrunner_webhooks_received_total"));
        assert!(output.contains("showrunner_scheduler_running"));
    }
}
