//! Observability configuration

use serde::Deserialize;

/// Main observability configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub tracing: TracingConfig,
    pub metrics: MetricsConfig,
}

/// Distributed tracing configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TracingConfig {
    /// Enable OpenTelemetry span export
    pub enabled: bool,
    /// OTLP gRPC endpoint
    pub otlp_endpoint: String,
    pub service_name: String,
    /// Fraction of traces kept, 0.0 to 1.0
    pub sampling_ratio: f64,
}

/// Prometheus metrics configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    /// Path the scrape endpoint is mounted on
    pub path: String,
}

impl TracingConfig {
    /// Sampling ratio forced into the 0.0..=1.0 range
    pub fn clamped_sampling_ratio(&self) -> f64 {
        if self.sampling_ratio.is_nan() {
            return 1.0;
        }

        self.sampling_ratio.clamp(0.0, 1.0)
    }
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            otlp_endpoint: "http://localhost:4317".to_string(),
            service_name: "api-key-desk".to_string(),
            sampling_ratio: 1.0,
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/metrics".to_string(),
        }
    }
}
