//! Builders wiring settings into the auth core and HTTP state.
//!
//! Dependency selection happens once here: a configured database selects the
//! Diesel store, a reachable Redis selects the shared cache and an enabled
//! notifier. Anything missing or unreachable degrades with a warning rather
//! than failing startup; only an invalid secret, cost or database does.

use std::sync::Arc;

use mockable::{Clock, DefaultClock};
use tracing::{info, warn};

use auth_service::domain::ports::{AuthMetrics, EventBus, SharedCacheBackend, UserStore};
use auth_service::domain::{
    Argon2CredentialHasher, AuthService, AuthServicePorts, EventNotifier, TokenIssuer,
    select_profile_cache,
};
use auth_service::inbound::http::health::DependencyReport;
use auth_service::inbound::http::state::{HttpState, HttpStatePorts};
use auth_service::outbound::cache::RedisCacheBackend;
use auth_service::outbound::events::RedisEventBus;
use auth_service::outbound::persistence::{DbPool, DieselUserStore, InMemoryUserStore, PoolConfig};
use auth_service::outbound::redis_pool::{RedisPool, RedisPoolConfig};
use auth_service::settings::{AuthSettings, secret_fingerprint};

/// Auth core plus the dependency modes it was built with.
pub(crate) struct AuthComponents {
    pub(crate) service: Arc<AuthService>,
    pub(crate) report: DependencyReport,
}

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(format!("{context}: {err}"))
}

async fn build_user_store(
    settings: &AuthSettings,
    clock: Arc<dyn Clock>,
) -> std::io::Result<Arc<dyn UserStore>> {
    match settings.database_url() {
        Some(url) => {
            let pool = DbPool::new(PoolConfig::new(url))
                .await
                .map_err(|err| startup_error("database pool", err))?;
            info!("using PostgreSQL user store");
            Ok(Arc::new(DieselUserStore::new(pool)))
        }
        None => {
            warn!("no database configured; users are kept in memory and lost on restart");
            Ok(Arc::new(InMemoryUserStore::new(clock)))
        }
    }
}

fn redis_pool(url: &str, purpose: &'static str) -> Option<RedisPool> {
    match RedisPool::new(&RedisPoolConfig::new(url)) {
        Ok(pool) => Some(pool),
        Err(err) => {
            warn!(purpose, error = %err, "redis pool could not be built");
            None
        }
    }
}

/// Build the auth core from settings.
///
/// # Errors
/// Returns [`std::io::Error`] when the JWT secret is missing, the hashing
/// cost is invalid, or a configured database cannot be reached.
pub(crate) async fn build_auth_components(
    settings: &AuthSettings,
    metrics: Arc<dyn AuthMetrics>,
) -> std::io::Result<AuthComponents> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);

    let secret = settings
        .jwt_secret()
        .map_err(|err| startup_error("token issuer", err))?;
    info!(
        fingerprint = %secret_fingerprint(secret.as_bytes()),
        "loaded JWT signing secret"
    );
    let tokens = TokenIssuer::new(secret, clock.clone())
        .map_err(|err| startup_error("token issuer", err))?;
    let hasher = Argon2CredentialHasher::new(settings.hashing_cost())
        .map_err(|err| startup_error("credential hasher", err))?;
    let token_ttl = settings
        .token_ttl()
        .map_err(|err| startup_error("settings", err))?;
    let cache_settings = settings
        .profile_cache()
        .map_err(|err| startup_error("settings", err))?;

    let store = build_user_store(settings, clock.clone()).await?;

    let cache_pool = settings
        .redis_url()
        .and_then(|url| redis_pool(url, "profile cache"));
    let bus_pool = match (settings.event_bus_url(), settings.redis_url()) {
        (Some(bus_url), Some(cache_url)) if bus_url == cache_url => cache_pool.clone(),
        (Some(bus_url), _) => redis_pool(bus_url, "event bus"),
        (None, _) => None,
    };

    let backend = cache_pool
        .map(|pool| Arc::new(RedisCacheBackend::new(pool)) as Arc<dyn SharedCacheBackend>);
    let bus = bus_pool.map(|pool| Arc::new(RedisEventBus::new(pool)) as Arc<dyn EventBus>);

    let cache = select_profile_cache(backend, cache_settings, clock).await;
    let notifier = EventNotifier::connect(bus, cache_settings.probe_timeout).await;
    let report = DependencyReport::new(cache.mode(), notifier.is_enabled());

    let service = AuthService::new(
        AuthServicePorts {
            store,
            hasher: Arc::new(hasher),
            tokens: Arc::new(tokens),
            cache,
            notifier: Arc::new(notifier),
            metrics,
        },
        token_ttl,
    );
    info!(
        cache_mode = report.cache_mode,
        notifier_enabled = report.notifier_enabled,
        "auth service assembled"
    );
    Ok(AuthComponents {
        service: Arc::new(service),
        report,
    })
}

/// Expose the auth core through the HTTP driving ports.
pub(crate) fn build_http_state(
    service: &Arc<AuthService>,
    settings: &AuthSettings,
) -> std::io::Result<HttpState> {
    let request_timeout = settings
        .request_timeout()
        .map_err(|err| startup_error("settings", err))?;
    Ok(HttpState::new(HttpStatePorts {
        registration: service.clone(),
        login: service.clone(),
        profile: service.clone(),
    })
    .with_request_timeout(request_timeout))
}
