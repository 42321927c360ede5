//! Prometheus metrics for the notifier service.
//!
//! - Notification lifecycle (created, marked read)
//! - Dispatch outcomes and per-channel deliveries
//! - Store operation latency

mod helpers;

pub use helpers::{encode_metrics, DispatchMetrics, NotificationMetrics, StoreMetrics};

use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, HistogramVec,
    IntCounter, IntCounterVec,
};

/// Prefix for all metrics
const METRIC_PREFIX: &str = "notifier";

lazy_static! {
    /// Notifications persisted by the dispatch manager
    pub static ref NOTIFICATIONS_CREATED_TOTAL: IntCounter = register_int_counter!(
        format!("{}_notifications_created_total", METRIC_PREFIX),
        "Total notifications created"
    ).unwrap();

    /// Notifications transitioned from unread to read
    pub static ref NOTIFICATIONS_MARKED_READ_TOTAL: IntCounter = register_int_counter!(
        format!("{}_notifications_marked_read_total", METRIC_PREFIX),
        "Total notifications marked as read"
    ).unwrap();

    /// Dispatch requests by result (success, no_recipients, unknown_template, store_error, ...)
    pub static ref DISPATCH_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_dispatch_total", METRIC_PREFIX),
        "Total dispatch requests by result",
        &["result"]
    ).unwrap();

    /// Channel deliveries by channel and result
    pub static ref CHANNEL_DELIVERIES_TOTAL: IntCounterVec = register_int_counter_vec!(
        format!("{}_channel_deliveries_total", METRIC_PREFIX),
        "Total channel deliveries by channel and result",
        &["channel", "result"]
    ).unwrap();

    /// Store operation latency in seconds
    pub static ref STORE_OPERATION_DURATION: HistogramVec = register_histogram_vec!(
        format!("{}_store_operation_duration_seconds", METRIC_PREFIX),
        "Store operation latency",
        &["backend", "operation"],
        vec![0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    ).unwrap();
}
