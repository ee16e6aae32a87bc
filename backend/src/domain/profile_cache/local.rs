//! Degraded-mode cache held in process memory.
//!
//! Entries live in a sharded `DashMap`, so unrelated keys never contend on one
//! lock. Every `put` spawns its own expiry task which removes the key after the
//! TTL, unless a later `put` replaced the entry in the meantime. Reads also
//! compare the entry age against the injected clock, so an entry is never
//! served past its TTL even if its timer has not fired yet.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use mockable::Clock;
use tracing::debug;

use super::{CacheMode, ProfileCache, ProfileCacheError};
use crate::domain::UserIdentity;
use crate::domain::ports::ProfileCacheKey;

#[derive(Debug, Clone)]
struct CacheEntry {
    value: UserIdentity,
    inserted_at: DateTime<Utc>,
    generation: u64,
}

/// In-process profile cache with timer-driven expiry.
pub struct LocalProfileCache {
    entries: Arc<DashMap<ProfileCacheKey, CacheEntry>>,
    ttl: Duration,
    max_age: TimeDelta,
    generations: AtomicU64,
    clock: Arc<dyn Clock>,
}

impl LocalProfileCache {
    /// Build an empty cache whose entries expire after `ttl`.
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            ttl,
            max_age: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            generations: AtomicU64::new(0),
            clock,
        }
    }

    /// Number of entries currently held, including ones awaiting expiry.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn schedule_expiry(&self, key: ProfileCacheKey, generation: u64) {
        let entries = Arc::clone(&self.entries);
        let ttl = self.ttl;
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            if entries
                .remove_if(&key, |_, entry| entry.generation == generation)
                .is_some()
            {
                debug!(%key, "expired in-process profile cache entry");
            }
        });
    }
}

#[async_trait]
impl ProfileCache for LocalProfileCache {
    fn mode(&self) -> CacheMode {
        CacheMode::Degraded
    }

    async fn get(&self, key: &ProfileCacheKey) -> Result<Option<UserIdentity>, ProfileCacheError> {
        // Clone out of the shard guard before any removal on the same shard.
        let Some(entry) = self.entries.get(key).map(|entry| entry.value().clone()) else {
            return Ok(None);
        };
        if self.clock.utc() - entry.inserted_at >= self.max_age {
            self.entries
                .remove_if(key, |_, current| current.generation == entry.generation);
            return Ok(None);
        }
        Ok(Some(entry.value))
    }

    async fn put(
        &self,
        key: &ProfileCacheKey,
        value: &UserIdentity,
    ) -> Result<(), ProfileCacheError> {
        let generation = self.generations.fetch_add(1, Ordering::Relaxed);
        self.entries.insert(
            key.clone(),
            CacheEntry {
                value: value.clone(),
                inserted_at: self.clock.utc(),
                generation,
            },
        );
        self.schedule_expiry(key.clone(), generation);
        Ok(())
    }

    async fn invalidate(&self, key: &ProfileCacheKey) -> Result<(), ProfileCacheError> {
        self.entries.remove(key);
        Ok(())
    }
}
