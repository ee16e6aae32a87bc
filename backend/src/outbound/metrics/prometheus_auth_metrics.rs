//! Prometheus adapter for auth service metrics.
//!
//! Metrics are registered with the registry shared by the HTTP request
//! metrics middleware, so everything is exposed on one `/metrics` endpoint.

use std::time::Duration;

use prometheus::{CounterVec, HistogramOpts, HistogramVec, Opts, Registry};

use crate::domain::ports::{AuthCounter, AuthHistogram, AuthMetrics};

/// Prometheus-backed [`AuthMetrics`] recorder.
///
/// # Metric Specification
///
/// - `auth_events_total{event}`: counter; `event` is an [`AuthCounter`] label
///   such as `cache_hit` or `login_rejected`.
/// - `auth_store_call_seconds{operation}`: histogram of user store call
///   latency; `operation` is `create_user`, `find_by_email` or `find_by_id`.
pub struct PrometheusAuthMetrics {
    events_total: CounterVec,
    store_call_seconds: HistogramVec,
}

impl PrometheusAuthMetrics {
    /// Create and register metrics with the given registry.
    ///
    /// # Errors
    ///
    /// Returns an error if a metric with the same name is already registered.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        let events_total = CounterVec::new(
            Opts::new("auth_events_total", "Auth service events by kind"),
            &["event"],
        )?;
        let store_call_seconds = HistogramVec::new(
            HistogramOpts::new(
                "auth_store_call_seconds",
                "User store call latency in seconds",
            )
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 30.0]),
            &["operation"],
        )?;
        registry.register(Box::new(events_total.clone()))?;
        registry.register(Box::new(store_call_seconds.clone()))?;
        Ok(Self {
            events_total,
            store_call_seconds,
        })
    }
}

impl AuthMetrics for PrometheusAuthMetrics {
    fn increment(&self, counter: AuthCounter) {
        self.events_total
            .with_label_values(&[counter.label()])
            .inc();
    }

    fn observe(&self, histogram: AuthHistogram, elapsed: Duration) {
        match histogram {
            AuthHistogram::StoreCall(operation) => self
                .store_call_seconds
                .with_label_values(&[operation.label()])
                .observe(elapsed.as_secs_f64()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::StoreOperation;
    use rstest::rstest;

    #[rstest]
    fn registers_both_families() {
        let registry = Registry::new();
        let metrics =
            PrometheusAuthMetrics::new(&registry).expect("metric registration should succeed");
        metrics.increment(AuthCounter::Registration);
        metrics.observe(
            AuthHistogram::StoreCall(StoreOperation::CreateUser),
            Duration::from_millis(3),
        );

        let names: Vec<String> = registry
            .gather()
            .iter()
            .map(|family| family.name().to_owned())
            .collect();
        assert!(names.contains(&"auth_events_total".to_owned()));
        assert!(names.contains(&"auth_store_call_seconds".to_owned()));
    }

    #[rstest]
    #[case(AuthCounter::CacheHit)]
    #[case(AuthCounter::LoginRejected)]
    #[case(AuthCounter::PublishFailure)]
    fn increments_counter_by_event_label(#[case] counter: AuthCounter) {
        let registry = Registry::new();
        let metrics =
            PrometheusAuthMetrics::new(&registry).expect("metric registration should succeed");

        metrics.increment(counter);
        metrics.increment(counter);

        let value = metrics
            .events_total
            .with_label_values(&[counter.label()])
            .get();
        assert_eq!(value as u64, 2);
    }

    #[rstest]
    fn observes_store_latency_per_operation() {
        let registry = Registry::new();
        let metrics =
            PrometheusAuthMetrics::new(&registry).expect("metric registration should succeed");

        metrics.observe(
            AuthHistogram::StoreCall(StoreOperation::FindById),
            Duration::from_millis(20),
        );

        let histogram = metrics
            .store_call_seconds
            .with_label_values(&["find_by_id"]);
        assert_eq!(histogram.get_sample_count(), 1);
        assert!((histogram.get_sample_sum() - 0.02).abs() < 1e-9);
    }

    #[rstest]
    fn double_registration_fails() {
        let registry = Registry::new();
        PrometheusAuthMetrics::new(&registry).expect("first registration");
        assert!(PrometheusAuthMetrics::new(&registry).is_err());
    }
}
