//! Domain port surface for recording authentication metrics.
//!
//! The orchestrator and profile cache report through this port instead of
//! process-wide registries, so domain tests run without a metrics backend.
//! Implementations may export to Prometheus or discard everything.

use std::time::Duration;

/// Countable outcomes recorded by the auth core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthCounter {
    /// Profile served from the cache.
    CacheHit,
    /// Profile absent from the cache.
    CacheMiss,
    /// Cache read or write failed and was absorbed.
    CacheFailure,
    /// Event publication failed and was absorbed.
    PublishFailure,
    /// A user was registered.
    Registration,
    /// A login issued a token.
    LoginSuccess,
    /// A login was rejected with invalid credentials.
    LoginRejected,
}

impl AuthCounter {
    /// Every counter, in label order.
    pub const ALL: [Self; 7] = [
        Self::CacheHit,
        Self::CacheMiss,
        Self::CacheFailure,
        Self::PublishFailure,
        Self::Registration,
        Self::LoginSuccess,
        Self::LoginRejected,
    ];

    /// Stable label used by exporters.
    pub const fn label(self) -> &'static str {
        match self {
            Self::CacheHit => "cache_hit",
            Self::CacheMiss => "cache_miss",
            Self::CacheFailure => "cache_failure",
            Self::PublishFailure => "publish_failure",
            Self::Registration => "registration",
            Self::LoginSuccess => "login_success",
            Self::LoginRejected => "login_rejected",
        }
    }
}

/// User store operations whose latency is observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    /// `UserStore::create_user`.
    CreateUser,
    /// `UserStore::find_by_email`.
    FindByEmail,
    /// `UserStore::find_by_id`.
    FindById,
}

impl StoreOperation {
    /// Stable label used by exporters and log fields.
    pub const fn label(self) -> &'static str {
        match self {
            Self::CreateUser => "create_user",
            Self::FindByEmail => "find_by_email",
            Self::FindById => "find_by_id",
        }
    }
}

/// Latency distributions recorded by the auth core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthHistogram {
    /// Wall time of a user store call, including time past the deadline.
    StoreCall(StoreOperation),
}

/// Metrics recording port for the auth core.
#[cfg_attr(test, mockall::automock)]
pub trait AuthMetrics: Send + Sync {
    /// Increment `counter` by one.
    fn increment(&self, counter: AuthCounter);

    /// Record one observation of `histogram`.
    fn observe(&self, histogram: AuthHistogram, elapsed: Duration);
}

/// No-op implementation for when metrics are disabled or in tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpAuthMetrics;

impl AuthMetrics for NoOpAuthMetrics {
    fn increment(&self, _counter: AuthCounter) {}

    fn observe(&self, _histogram: AuthHistogram, _elapsed: Duration) {}
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use std::collections::HashSet;

    use super::*;
    use rstest::rstest;

    #[rstest]
    fn counter_labels_are_unique() {
        let labels: HashSet<_> = AuthCounter::ALL.iter().map(|c| c.label()).collect();
        assert_eq!(labels.len(), AuthCounter::ALL.len());
    }

    #[rstest]
    fn noop_metrics_accept_everything() {
        let metrics = NoOpAuthMetrics;
        for counter in AuthCounter::ALL {
            metrics.increment(counter);
        }
        metrics.observe(
            AuthHistogram::StoreCall(StoreOperation::FindById),
            Duration::from_millis(3),
        );
    }
}
