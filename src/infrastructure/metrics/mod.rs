//! Prometheus metrics for the mailer.
//!
//! This module provides metrics for monitoring notification delivery:
//! - Template metrics (cache loads, render latency)
//! - Dispatch metrics (attempts by result, transport latency)
//! - Notification metrics (caller-facing outcomes by type)

mod helpers;

pub use helpers::{encode_metrics, DispatchMetrics, NotificationMetrics, TemplateMetrics};

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_histogram_vec, register_int_counter_vec, Histogram,
    HistogramVec, IntCounterVec,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "mailer";

lazy_static! {
    // ============================================================================
    // Template Metrics
    // ============================================================================

    /// Template loads from disk by result (loaded, not_found, unreadable, malformed)
    pub static ref TEMPLATE_LOADS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_template_loads_total", METRIC_PREFIX),
        "Template loads from the template directory",
        &["result"]
    ).unwrap();

    /// Time spent rendering a template
    pub static ref TEMPLATE_RENDER_SECONDS: HistogramVec = register_histogram_vec!(
        format!("{}_template_render_seconds", METRIC_PREFIX),
        "Template render latency",
        &["template"],
        vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05]
    ).unwrap();

    // ============================================================================
    // Dispatch Metrics
    // ============================================================================

    /// Transport attempts by notification type and result
    pub static ref DISPATCH_ATTEMPTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_dispatch_attempts_total", METRIC_PREFIX),
        "Mail transport attempts",
        &["kind", "result"]
    ).unwrap();

    /// Delivery failures logged and swallowed under a best-effort policy
    pub static ref DELIVERY_FAILURES_SWALLOWED_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_delivery_failures_swallowed_total", METRIC_PREFIX),
        "Best-effort delivery failures that were not surfaced",
        &["kind"]
    ).unwrap();

    /// Time spent inside the mail transport
    pub static ref DISPATCH_LATENCY: Histogram = register_histogram!(
        format!("{}_dispatch_latency_seconds", METRIC_PREFIX),
        "Mail transport latency",
        vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]
    ).unwrap();

    // ============================================================================
    // Notification Metrics
    // ============================================================================

    /// Caller-facing outcomes by notification type
    pub static ref NOTIFICATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_notifications_total", METRIC_PREFIX),
        "Processed notification requests",
        &["kind", "outcome"]
    ).unwrap();
}
