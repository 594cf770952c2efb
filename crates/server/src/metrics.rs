//! Prometheus metrics for the parcel server.
//!
//! Labels never carry session IDs or file names. The `/metrics` route is only
//! mounted when `server.metrics_enabled` is set.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{
    self, Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::{LazyLock, Once};

/// Global Prometheus registry for all metrics.
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// Upload metrics
pub static FILES_UPLOADED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "parcel_files_uploaded_total",
        "Total number of files stored in drop folders",
    )
    .expect("metric creation failed")
});

pub static BYTES_UPLOADED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "parcel_bytes_uploaded_total",
        "Total bytes written to drop folders",
    )
    .expect("metric creation failed")
});

pub static UPLOADS_RENAMED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "parcel_uploads_renamed_total",
        "Uploads stored under an alternate name because of a collision",
    )
    .expect("metric creation failed")
});

pub static UPLOAD_ERRORS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new("parcel_upload_errors_total", "Total upload errors by kind"),
        &["kind"],
    )
    .expect("metric creation failed")
});

// Download metrics
pub static FILES_DOWNLOADED: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "parcel_files_downloaded_total",
        "Total number of files streamed from serve folders",
    )
    .expect("metric creation failed")
});

// Notification metrics
pub static NOTIFICATION_DELIVERIES: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "parcel_notification_deliveries_total",
            "Notification trigger runs by outcome",
        ),
        &["outcome"],
    )
    .expect("metric creation failed")
});

pub static NOTIFICATIONS_PENDING: LazyLock<IntGauge> = LazyLock::new(|| {
    IntGauge::new(
        "parcel_notifications_pending",
        "Uploaded files waiting for the next notification",
    )
    .expect("metric creation failed")
});

pub static NOTIFICATION_DELIVERY_DURATION: LazyLock<Histogram> = LazyLock::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "parcel_notification_delivery_duration_seconds",
            "Time taken to drain and deliver one notification batch",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
    )
    .expect("metric creation failed")
});

static REGISTER_ONCE: Once = Once::new();

/// Register all metrics with the global registry. Safe to call more than once.
pub fn register_metrics() {
    REGISTER_ONCE.call_once(|| {
        REGISTRY
            .register(Box::new(FILES_UPLOADED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(BYTES_UPLOADED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(UPLOADS_RENAMED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(UPLOAD_ERRORS.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(FILES_DOWNLOADED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(NOTIFICATION_DELIVERIES.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(NOTIFICATIONS_PENDING.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(NOTIFICATION_DELIVERY_DURATION.clone()))
            .expect("metric registration failed");
    });
}

/// Handler for the `/metrics` endpoint.
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = Vec::new();
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            format!("Failed to encode metrics: {e}").into_bytes(),
        ),
    }
}

/// Helper to record upload errors by kind.
pub fn record_upload_error(kind: &str) {
    UPLOAD_ERRORS.with_label_values(&[kind]).inc();
}
