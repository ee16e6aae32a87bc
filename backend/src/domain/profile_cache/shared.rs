//! Shared-mode cache storing JSON profiles in an external backend.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::{CacheMode, ProfileCache, ProfileCacheError};
use crate::domain::UserIdentity;
use crate::domain::ports::{ProfileCacheKey, SharedCacheBackend};

/// Profile cache backed by a [`SharedCacheBackend`] with server-side expiry.
pub struct SharedProfileCache {
    backend: Arc<dyn SharedCacheBackend>,
    ttl: Duration,
}

impl SharedProfileCache {
    /// Wrap `backend`, writing entries with `ttl`.
    pub fn new(backend: Arc<dyn SharedCacheBackend>, ttl: Duration) -> Self {
        Self { backend, ttl }
    }
}

#[async_trait]
impl ProfileCache for SharedProfileCache {
    fn mode(&self) -> CacheMode {
        CacheMode::Shared
    }

    async fn get(&self, key: &ProfileCacheKey) -> Result<Option<UserIdentity>, ProfileCacheError> {
        let Some(bytes) = self
            .backend
            .get(key)
            .await
            .map_err(|err| ProfileCacheError::backend(err.to_string()))?
        else {
            return Ok(None);
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|err| ProfileCacheError::serialization(err.to_string()))
    }

    async fn put(
        &self,
        key: &ProfileCacheKey,
        value: &UserIdentity,
    ) -> Result<(), ProfileCacheError> {
        let bytes = serde_json::to_vec(value)
            .map_err(|err| ProfileCacheError::serialization(err.to_string()))?;
        self.backend
            .set(key, &bytes, self.ttl)
            .await
            .map_err(|err| ProfileCacheError::backend(err.to_string()))
    }

    async fn invalidate(&self, key: &ProfileCacheKey) -> Result<(), ProfileCacheError> {
        self.backend
            .delete(key)
            .await
            .map_err(|err| ProfileCacheError::backend(err.to_string()))
    }
}
