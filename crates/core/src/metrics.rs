//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Workflow dispatches (main and backup triggers)
//! - Webhook ingestion (progress and media-ready notifications)
//! - Uploads and publishes by artifact kind

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Trigger Metrics
// =============================================================================

/// Workflow dispatches total by trigger type and result.
pub static DISPATCHES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("showrunner_dispatches_total", "Total workflow dispatches"),
        &["trigger", "result"], // trigger: "main", "backup"; result: "success", "error"
    )
    .unwrap()
});

/// Backup checks that decided not to dispatch, by reason.
pub static BACKUP_SKIPS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "showrunner_backup_skips_total",
            "Backup checks resolved without dispatching",
        ),
        &["reason"], // "already_uploaded", "still_processing", "attempts_exhausted"
    )
    .unwrap()
});

// =============================================================================
// Webhook Metrics
// =============================================================================

/// Webhook notifications received by kind.
pub static WEBHOOKS_RECEIVED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "showrunner_webhooks_received_total",
            "Webhook notifications received",
        ),
        &["kind"], // "progress", "media_ready"
    )
    .unwrap()
});

/// Notifications referencing a run id with no persisted run.
pub static UNKNOWN_RUN_NOTIFICATIONS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "showrunner_unknown_run_notifications_total",
        "Notifications received for run ids with no persisted run",
    )
    .unwrap()
});

// =============================================================================
// Upload and Publish Metrics
// =============================================================================

/// Uploads total by artifact kind and result.
pub static UPLOADS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("showrunner_uploads_total", "Total media uploads"),
        &["kind", "result"], // kind: "primary", "secondary"
    )
    .unwrap()
});

/// Metadata fetches that fell back to placeholder metadata.
pub static METADATA_FALLBACKS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "showrunner_metadata_fallbacks_total",
        "Uploads that proceeded with placeholder metadata",
    )
    .unwrap()
});

/// Publishes total by artifact kind and result.
pub static PUBLISHES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("showrunner_publishes_total", "Total artifact publishes"),
        &["kind", "result"],
    )
    .unwrap()
});

/// External service request duration.
pub static EXTERNAL_SERVICE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "showrunner_external_service_duration_seconds",
            "Duration of external service calls",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["service", "operation"],
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(DISPATCHES_TOTAL.clone()),
        Box::new(BACKUP_SKIPS_TOTAL.clone()),
        Box::new(WEBHOOKS_RECEIVED.clone()),
        Box::new(UNKNOWN_RUN_NOTIFICATIONS.clone()),
        Box::new(UPLOADS_TOTAL.clone()),
        Box::new(METADATA_FALLBACKS.clone()),
        Box::new(PUBLISHES_TOTAL.clone()),
        Box::new(EXTERNAL_SERVICE_DURATION.clone()),
    ]
}
