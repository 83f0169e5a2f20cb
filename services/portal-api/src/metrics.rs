//! Request metrics recorded through the `metrics` facade.

use std::time::Duration;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

pub const REQUESTS_TOTAL: &str = "ogc_requests_total";
pub const REQUEST_DURATION_MS: &str = "ogc_request_duration_ms";

/// Install the global Prometheus recorder.
pub fn install_recorder() -> anyhow::Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    Ok(handle)
}

/// One dispatched OGC request.
pub fn record_request(product: &str, service: &str, request: &str, status: u16, elapsed: Duration) {
    counter!(
        REQUESTS_TOTAL,
        "product" => product.to_string(),
        "service" => service.to_string(),
        "request" => request.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        REQUEST_DURATION_MS,
        "product" => product.to_string(),
        "service" => service.to_string()
    )
    .record(elapsed.as_secs_f64() * 1000.0);
}
