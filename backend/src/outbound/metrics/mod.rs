//! Outbound adapters for metrics exporting.
//!
//! Feature-gated behind `metrics`; without it the service records through
//! `NoOpAuthMetrics`.

mod prometheus_auth_metrics;

pub use prometheus_auth_metrics::PrometheusAuthMetrics;
