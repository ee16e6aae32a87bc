//! Port for the external shared key/value cache.
use std::time::Duration;

use async_trait::async_trait;

use super::{ProfileCacheKey, define_port_error};

define_port_error! {
    /// Errors surfaced by shared cache adapters.
    pub enum SharedCacheError {
        /// Backend connection could not be checked out or established.
        Connection { message: String } => "shared cache connection failed: {message}",
        /// Backend rejected or failed the command.
        Command { message: String } => "shared cache command failed: {message}",
    }
}

/// Byte-oriented cache with server-enforced expiry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SharedCacheBackend: Send + Sync {
    /// Read the bytes stored under `key`.
    async fn get(&self, key: &ProfileCacheKey) -> Result<Option<Vec<u8>>, SharedCacheError>;

    /// Store `value` under `key`, expiring after `ttl`.
    async fn set(
        &self,
        key: &ProfileCacheKey,
        value: &[u8],
        ttl: Duration,
    ) -> Result<(), SharedCacheError>;

    /// Remove `key`; absent keys are not an error.
    async fn delete(&self, key: &ProfileCacheKey) -> Result<(), SharedCacheError>;

    /// Health check used once when selecting the cache mode.
    async fn ping(&self) -> Result<(), SharedCacheError>;
}
