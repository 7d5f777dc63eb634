use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Duration;

/// Install the Prometheus recorder and describe all metrics
pub fn init_metrics() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install Prometheus recorder: {}", e))?;

    init_metric_descriptions();

    Ok(handle)
}

/// Initialize metric descriptions (can be called multiple times safely)
fn init_metric_descriptions() {
    describe_counter!(
        "estimate_requests_total",
        "Total number of API requests by endpoint"
    );
    describe_counter!(
        "estimate_payment_verifications_total",
        "Payment verification attempts by outcome"
    );
    describe_counter!(
        "estimate_entitlement_rejections_total",
        "Rejected entitlement credentials by reason"
    );
    describe_histogram!(
        "estimate_request_duration_seconds",
        "Request duration in seconds"
    );
    describe_gauge!(
        "estimate_gate_info",
        "Gateway version and build information"
    );

    gauge!("estimate_gate_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);
}

/// Record a request
pub fn record_request(endpoint: &'static str) {
    counter!("estimate_requests_total", "endpoint" => endpoint).increment(1);
}

/// Record the outcome of a payment verification
pub fn record_payment_verification(outcome: &'static str) {
    counter!("estimate_payment_verifications_total", "outcome" => outcome).increment(1);
}

/// Record a rejected credential
pub fn record_entitlement_rejection(reason: &'static str) {
    counter!("estimate_entitlement_rejections_total", "reason" => reason).increment(1);
}

/// Record request duration
pub fn record_duration(endpoint: &'static str, duration: Duration) {
    histogram!("estimate_request_duration_seconds", "endpoint" => endpoint)
        .record(duration.as_secs_f64());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_metrics() {
        init_metric_descriptions();

        record_request("/api/get-breakdown");
        record_payment_verification("verified");
        record_entitlement_rejection("expired");
        record_duration("/api/verify-payment", Duration::from_millis(120));

        // No recorder installed; the calls must simply not panic
    }
}
