//! Redis adapter for the shared profile cache backend.
//!
//! Values are opaque bytes written with `SET key value EX ttl`, so expiry is
//! enforced by the server and every process sees the same entries.

use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::redis::{self, AsyncCommands};

use crate::domain::ports::{ProfileCacheKey, SharedCacheBackend, SharedCacheError};
use crate::outbound::redis_pool::RedisPool;

/// [`SharedCacheBackend`] backed by a Redis pool.
#[derive(Clone)]
pub struct RedisCacheBackend {
    pool: RedisPool,
}

impl RedisCacheBackend {
    /// Wrap an existing pool.
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }
}

/// Seconds for `SET EX`; Redis rejects zero, so sub-second TTLs round up.
fn expiry_seconds(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

fn command_error(err: &redis::RedisError) -> SharedCacheError {
    if err.is_connection_dropped() || err.is_connection_refusal() || err.is_timeout() {
        SharedCacheError::connection(err.to_string())
    } else {
        SharedCacheError::command(err.to_string())
    }
}

#[async_trait]
impl SharedCacheBackend for RedisCacheBackend {
    async fn get(&self, key: &ProfileCacheKey) -> Result<Option<Vec<u8>>, SharedCacheError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| SharedCacheError::connection(err.to_string()))?;
        conn.get::<_, Option<Vec<u8>>>(key.as_str())
            .await
            .map_err(|err| command_error(&err))
    }

    async fn set(
        &self,
        key: &ProfileCacheKey,
        value: &[u8],
        ttl: Duration,
    ) -> Result<(), SharedCacheError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| SharedCacheError::connection(err.to_string()))?;
        conn.set_ex::<_, _, ()>(key.as_str(), value, expiry_seconds(ttl))
            .await
            .map_err(|err| command_error(&err))
    }

    async fn delete(&self, key: &ProfileCacheKey) -> Result<(), SharedCacheError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| SharedCacheError::connection(err.to_string()))?;
        conn.del::<_, ()>(key.as_str())
            .await
            .map_err(|err| command_error(&err))
    }

    async fn ping(&self) -> Result<(), SharedCacheError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| SharedCacheError::connection(err.to_string()))?;
        redis::cmd("PING")
            .query_async::<String>(&mut *conn)
            .await
            .map(|_| ())
            .map_err(|err| command_error(&err))
    }
}

#[cfg(test)]
mod tests {
    //! Offline coverage; commands against a live server are exercised by the
    //! startup health check.
    use super::*;
    use crate::outbound::redis_pool::RedisPoolConfig;
    use rstest::rstest;

    #[rstest]
    #[case(Duration::from_millis(1), 1)]
    #[case(Duration::from_secs(1), 1)]
    #[case(Duration::from_secs(300), 300)]
    fn expiry_rounds_up_to_one_second(#[case] ttl: Duration, #[case] expected: u64) {
        assert_eq!(expiry_seconds(ttl), expected);
    }

    #[rstest]
    #[tokio::test]
    async fn unreachable_server_fails_ping_as_connection_error() {
        let pool = RedisPool::new(
            &RedisPoolConfig::new("redis://127.0.0.1:1")
                .with_connection_timeout(Duration::from_millis(100)),
        )
        .expect("valid url");
        let backend = RedisCacheBackend::new(pool);

        let err = backend.ping().await.expect_err("nothing listens on port 1");
        assert!(matches!(err, SharedCacheError::Connection { .. }));
    }
}
