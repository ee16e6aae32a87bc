//! Service configuration loaded via OrthoConfig.
//!
//! Values come from CLI flags, `AUTH_*` environment variables, or a config
//! file. Everything except the JWT secret has a default; absent Redis or
//! database URLs select the degraded cache and the in-memory store.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::domain::{HashingCost, ProfileCacheSettings};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

/// Length of the secret fingerprint in bytes before hex encoding.
const FINGERPRINT_BYTES: usize = 8;

/// Errors raised while interpreting loaded settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// No JWT signing secret was supplied.
    #[error("AUTH_JWT_SECRET must be set to a non-empty value")]
    MissingJwtSecret,
    /// The bind address could not be parsed.
    #[error("invalid bind address '{value}': {message}")]
    InvalidBindAddr { value: String, message: String },
    /// A duration setting was zero.
    #[error("{name} must be greater than zero")]
    ZeroDuration { name: &'static str },
}

/// Service settings.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "AUTH")]
pub struct AuthSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; the in-memory store is used when absent.
    pub database_url: Option<String>,
    /// Redis URL for the shared profile cache.
    pub redis_url: Option<String>,
    /// Redis URL for event publication; defaults to `redis_url`.
    pub event_bus_url: Option<String>,
    /// HS256 signing secret.
    pub jwt_secret: Option<String>,
    #[ortho_config(default = 24)]
    pub token_ttl_hours: u64,
    #[ortho_config(default = 30)]
    pub request_timeout_secs: u64,
    #[ortho_config(default = 300)]
    pub profile_cache_ttl_secs: u64,
    /// Upper bound on each startup dependency probe.
    #[ortho_config(default = 500)]
    pub dependency_probe_timeout_ms: u64,
    pub hash_memory_kib: Option<u32>,
    pub hash_iterations: Option<u32>,
    pub hash_parallelism: Option<u32>,
}

impl std::fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSettings")
            .field("bind_addr", &self.bind_addr)
            .field("database_configured", &self.database_url.is_some())
            .field("redis_configured", &self.redis_url.is_some())
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .field("token_ttl_hours", &self.token_ttl_hours)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish_non_exhaustive()
    }
}

fn non_zero(name: &'static str, duration: Duration) -> Result<Duration, SettingsError> {
    if duration.is_zero() {
        return Err(SettingsError::ZeroDuration { name });
    }
    Ok(duration)
}

impl AuthSettings {
    /// Parsed listen address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse()
            .map_err(|err: std::net::AddrParseError| SettingsError::InvalidBindAddr {
                value: raw.to_owned(),
                message: err.to_string(),
            })
    }

    /// Configured database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url.as_deref().filter(|url| !url.trim().is_empty())
    }

    /// Configured cache Redis URL, ignoring blank values.
    pub fn redis_url(&self) -> Option<&str> {
        self.redis_url.as_deref().filter(|url| !url.trim().is_empty())
    }

    /// Event bus URL, falling back to the cache Redis URL.
    pub fn event_bus_url(&self) -> Option<&str> {
        self.event_bus_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .or_else(|| self.redis_url())
    }

    /// The JWT signing secret; startup fails without one.
    pub fn jwt_secret(&self) -> Result<&str, SettingsError> {
        self.jwt_secret
            .as_deref()
            .filter(|secret| !secret.trim().is_empty())
            .ok_or(SettingsError::MissingJwtSecret)
    }

    /// Token lifetime.
    pub fn token_ttl(&self) -> Result<Duration, SettingsError> {
        non_zero(
            "token_ttl_hours",
            Duration::from_secs(self.token_ttl_hours.saturating_mul(3600)),
        )
    }

    /// Per-request deadline.
    pub fn request_timeout(&self) -> Result<Duration, SettingsError> {
        non_zero(
            "request_timeout_secs",
            Duration::from_secs(self.request_timeout_secs),
        )
    }

    /// Profile cache TTL and probe bound.
    pub fn profile_cache(&self) -> Result<ProfileCacheSettings, SettingsError> {
        Ok(ProfileCacheSettings {
            ttl: non_zero(
                "profile_cache_ttl_secs",
                Duration::from_secs(self.profile_cache_ttl_secs),
            )?,
            probe_timeout: self.dependency_probe_timeout()?,
        })
    }

    /// Upper bound on each startup dependency probe.
    pub fn dependency_probe_timeout(&self) -> Result<Duration, SettingsError> {
        non_zero(
            "dependency_probe_timeout_ms",
            Duration::from_millis(self.dependency_probe_timeout_ms),
        )
    }

    /// Argon2id cost, defaulting each unset parameter.
    pub fn hashing_cost(&self) -> HashingCost {
        let default = HashingCost::DEFAULT;
        HashingCost {
            memory_kib: self.hash_memory_kib.unwrap_or(default.memory_kib),
            iterations: self.hash_iterations.unwrap_or(default.iterations),
            parallelism: self.hash_parallelism.unwrap_or(default.parallelism),
        }
    }
}

/// Truncated SHA-256 fingerprint of a signing secret.
///
/// Lets operators confirm which secret is active without logging it.
///
/// # Examples
///
/// ```rust
/// use auth_service::settings::secret_fingerprint;
///
/// let fp = secret_fingerprint(b"correct horse battery staple");
/// assert_eq!(fp.len(), 16);
/// assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
/// ```
#[must_use]
pub fn secret_fingerprint(secret: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret);
    let result = hasher.finalize();
    hex::encode(&result[..FINGERPRINT_BYTES])
}
