//! Metrics helper structs for convenient metric recording

use std::time::Duration;

use prometheus::{Encoder, TextEncoder};

use super::{
    DELIVERY_FAILURES_SWALLOWED_TOTAL, DISPATCH_ATTEMPTS_TOTAL, DISPATCH_LATENCY,
    NOTIFICATIONS_TOTAL, TEMPLATE_LOADS_TOTAL, TEMPLATE_RENDER_SECONDS,
};

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording template metrics
pub struct TemplateMetrics;

impl TemplateMetrics {
    /// Record a template load attempt
    pub fn record_load(result: &str) {
        TEMPLATE_LOADS_TOTAL.with_label_values(&[result]).inc();
    }

    /// Record render time for a template
    pub fn record_render(template_id: &str, elapsed: Duration) {
        TEMPLATE_RENDER_SECONDS
            .with_label_values(&[template_id])
            .observe(elapsed.as_secs_f64());
    }
}

/// Helper struct for recording dispatch metrics
pub struct DispatchMetrics;

impl DispatchMetrics {
    pub fn record_delivered(kind: &str, elapsed: Duration) {
        DISPATCH_ATTEMPTS_TOTAL
            .with_label_values(&[kind, "delivered"])
            .inc();
        DISPATCH_LATENCY.observe(elapsed.as_secs_f64());
    }

    pub fn record_failed(kind: &str, elapsed: Duration) {
        DISPATCH_ATTEMPTS_TOTAL.with_label_values(&[kind, "failed"]).inc();
        DISPATCH_LATENCY.observe(elapsed.as_secs_f64());
    }

    /// Record a failure swallowed by a best-effort policy
    pub fn record_swallowed(kind: &str) {
        DELIVERY_FAILURES_SWALLOWED_TOTAL
            .with_label_values(&[kind])
            .inc();
    }
}

/// Helper struct for recording caller-facing outcomes
pub struct NotificationMetrics;

impl NotificationMetrics {
    pub fn record_outcome(kind: &str, outcome: &str) {
        NOTIFICATIONS_TOTAL.with_label_values(&[kind, outcome]).inc();
    }
}
