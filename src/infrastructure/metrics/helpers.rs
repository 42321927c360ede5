//! Metric recording helpers

use prometheus::{Encoder, HistogramTimer, TextEncoder};

use super::{
    CHANNEL_DELIVERIES_TOTAL, DISPATCH_TOTAL, NOTIFICATIONS_CREATED_TOTAL,
    NOTIFICATIONS_MARKED_READ_TOTAL, STORE_OPERATION_DURATION,
};

/// Encode all registered metrics in the Prometheus text format
pub fn encode_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer).unwrap_or_default())
}

/// Helper struct for recording notification lifecycle metrics
pub struct NotificationMetrics;

impl NotificationMetrics {
    pub fn record_created(count: usize) {
        NOTIFICATIONS_CREATED_TOTAL.inc_by(count as u64);
    }

    pub fn record_marked_read(count: u64) {
        NOTIFICATIONS_MARKED_READ_TOTAL.inc_by(count);
    }
}

/// Helper struct for recording dispatch metrics
pub struct DispatchMetrics;

impl DispatchMetrics {
    pub fn record_result(result: &str) {
        DISPATCH_TOTAL.with_label_values(&[result]).inc();
    }

    pub fn record_delivery(channel: &str, success: bool) {
        let result = if success { "success" } else { "failure" };
        CHANNEL_DELIVERIES_TOTAL
            .with_label_values(&[channel, result])
            .inc();
    }
}

/// Helper struct for timing store operations
pub struct StoreMetrics;

impl StoreMetrics {
    /// Start a timer that observes the elapsed time when dropped
    pub fn start_timer(backend: &str, operation: &str) -> HistogramTimer {
        STORE_OPERATION_DURATION
            .with_label_values(&[backend, operation])
            .start_timer()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_contains_recorded_metrics() {
        NotificationMetrics::record_created(2);
        DispatchMetrics::record_result("success");
        DispatchMetrics::record_delivery("redis", true);
        drop(StoreMetrics::start_timer("memory", "find"));

        let output = encode_metrics().unwrap();
        assert!(output.contains("notifier_notifications_created_total"));
        assert!(output.contains("notifier_dispatch_total"));
        assert!(output.contains("notifier_channel_deliveries_total"));
        assert!(output.contains("notifier_store_operation_duration_seconds"));
    }
}
