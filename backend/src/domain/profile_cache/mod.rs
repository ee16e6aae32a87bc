//! Read-through profile cache with shared and degraded modes.
//!
//! The mode is chosen once, when the cache is built: a shared backend that
//! answers its health check yields [`SharedProfileCache`], anything else yields
//! the in-process [`LocalProfileCache`]. A degraded cache is never upgraded
//! later, even if the backend recovers; that needs a restart.
//!
//! Writes are best effort. The orchestrator detaches `put` calls and a failed
//! write never changes what a read returns.

mod local;
mod shared;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{info, warn};

use super::UserIdentity;
use super::ports::{ProfileCacheKey, SharedCacheBackend, define_port_error};

pub use local::LocalProfileCache;
pub use shared::SharedProfileCache;

/// Default time-to-live for cached profiles.
pub const DEFAULT_PROFILE_TTL: Duration = Duration::from_secs(5 * 60);

define_port_error! {
    /// Errors surfaced by profile cache implementations.
    pub enum ProfileCacheError {
        /// Cache backend is unavailable or failed the command.
        Backend { message: String } => "profile cache backend failure: {message}",
        /// Serialisation or deserialisation of cached content failed.
        Serialization { message: String } => "profile cache serialisation failed: {message}",
    }
}

/// Operating mode fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheMode {
    /// Entries live in the shared backend and are visible to every process.
    Shared,
    /// Entries live in this process only, with timer-driven expiry.
    Degraded,
}

impl CacheMode {
    /// Label used in logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Shared => "shared",
            Self::Degraded => "degraded",
        }
    }
}

/// Profile cache keyed by [`ProfileCacheKey`].
///
/// ## Invariants
/// - `get` never returns an entry older than the TTL relative to its `put`,
///   clock skew between processes in shared mode aside.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileCache: Send + Sync {
    /// Mode selected at construction.
    fn mode(&self) -> CacheMode;

    /// Read a cached profile.
    async fn get(&self, key: &ProfileCacheKey) -> Result<Option<UserIdentity>, ProfileCacheError>;

    /// Store a profile for the configured TTL.
    async fn put(&self, key: &ProfileCacheKey, value: &UserIdentity)
    -> Result<(), ProfileCacheError>;

    /// Drop a cached profile; absent keys are not an error.
    async fn invalidate(&self, key: &ProfileCacheKey) -> Result<(), ProfileCacheError>;
}

/// Settings used when selecting the cache mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileCacheSettings {
    /// Entry time-to-live.
    pub ttl: Duration,
    /// Upper bound on the startup health check.
    pub probe_timeout: Duration,
}

impl Default for ProfileCacheSettings {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_PROFILE_TTL,
            probe_timeout: Duration::from_millis(500),
        }
    }
}

/// Probe `backend` once and build the matching cache.
///
/// # Examples
/// ```
/// use std::sync::Arc;
///
/// use auth_service::domain::{CacheMode, ProfileCacheSettings, select_profile_cache};
/// use mockable::DefaultClock;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let cache =
///     select_profile_cache(None, ProfileCacheSettings::default(), Arc::new(DefaultClock)).await;
/// assert_eq!(cache.mode(), CacheMode::Degraded);
/// # });
/// ```
pub async fn select_profile_cache(
    backend: Option<Arc<dyn SharedCacheBackend>>,
    settings: ProfileCacheSettings,
    clock: Arc<dyn Clock>,
) -> Arc<dyn ProfileCache> {
    let degraded = |clock: Arc<dyn Clock>| -> Arc<dyn ProfileCache> {
        Arc::new(LocalProfileCache::new(settings.ttl, clock))
    };
    let Some(backend) = backend else {
        warn!("no shared cache configured; using in-process profile cache");
        return degraded(clock);
    };
    match tokio::time::timeout(settings.probe_timeout, backend.ping()).await {
        Ok(Ok(())) => {
            info!(
                ttl_secs = settings.ttl.as_secs(),
                "shared cache reachable; using shared profile cache"
            );
            Arc::new(SharedProfileCache::new(backend, settings.ttl))
        }
        Ok(Err(error)) => {
            warn!(%error, "shared cache unavailable; using in-process profile cache");
            degraded(clock)
        }
        Err(_) => {
            warn!(
                timeout_ms = u64::try_from(settings.probe_timeout.as_millis()).unwrap_or(u64::MAX),
                "shared cache health check timed out; using in-process profile cache"
            );
            degraded(clock)
        }
    }
}

#[cfg(test)]
mod tests;
