use std::sync::LazyLock;

use prometheus::{
    register_histogram_vec_with_registry, register_int_counter_vec_with_registry, Encoder,
    HistogramVec, IntCounterVec, Registry as PrometheusRegistry, TextEncoder,
};
use tracing::error;

pub static METRICS_PROVIDER: LazyLock<MetricsProvider> =
    LazyLock::new(|| MetricsProvider::new().expect("Unable to create metrics provider"));

pub struct MetricsProvider {
    registry: PrometheusRegistry,
    pub tequila_requests_total: IntCounterVec,
    pub tequila_request_duration: HistogramVec,
    pub client_registry_refresh_total: IntCounterVec,
    pub authorization_decisions_total: IntCounterVec,
}

impl MetricsProvider {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = PrometheusRegistry::new();

        let tequila_requests_total = register_int_counter_vec_with_registry!(
            "tequila_requests_total",
            "Total number of requests sent to the Tequila server.",
            &["endpoint", "result"],
            &registry
        )
        .inspect_err(|error| error!("Unable to create tequila_requests_total metric: {error}"))?;

        let tequila_request_duration = register_histogram_vec_with_registry!(
            "tequila_request_duration_seconds",
            "Tequila back-channel request latencies in seconds.",
            &["endpoint"],
            &registry
        )
        .inspect_err(|error| {
            error!("Unable to create tequila_request_duration_seconds metric: {error}");
        })?;

        let client_registry_refresh_total = register_int_counter_vec_with_registry!(
            "client_registry_refresh_total",
            "Total number of client registry refreshes.",
            &["backend", "result"],
            &registry
        )
        .inspect_err(|error| {
            error!("Unable to create client_registry_refresh_total metric: {error}");
        })?;

        let authorization_decisions_total = register_int_counter_vec_with_registry!(
            "authorization_decisions_total",
            "Total number of require-clause authorization decisions.",
            &["result"],
            &registry
        )
        .inspect_err(|error| {
            error!("Unable to create authorization_decisions_total metric: {error}");
        })?;

        Ok(Self {
            registry,
            tequila_requests_total,
            tequila_request_duration,
            client_registry_refresh_total,
            authorization_decisions_total,
        })
    }

    /// Renders every metric in the Prometheus text format, with its content type.
    pub fn gather(&self) -> Result<(String, Vec<u8>), prometheus::Error> {
        let mut buffer = vec![];
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok((encoder.format_type().to_string(), buffer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gather_renders_registered_metrics() {
        let provider = MetricsProvider::new().unwrap();
        provider
            .client_registry_refresh_total
            .with_label_values(&["json", "success"])
            .inc();

        let (content_type, body) = provider.gather().unwrap();
        let body = String::from_utf8(body).unwrap();

        assert!(content_type.starts_with("text/plain"));
        assert!(body.contains("client_registry_refresh_total"));
    }
}
