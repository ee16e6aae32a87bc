//! Redis pub/sub adapter for the event bus port.
//!
//! Each domain event becomes one `PUBLISH <topic> <payload>`. Delivery is
//! at-most-once: subscribers that are not listening miss the message.

use async_trait::async_trait;
use bb8_redis::redis::{self, AsyncCommands};
use tracing::debug;

use crate::domain::ports::{EventBus, EventBusError};
use crate::outbound::redis_pool::RedisPool;

/// [`EventBus`] publishing on Redis channels named after the topic.
#[derive(Clone)]
pub struct RedisEventBus {
    pool: RedisPool,
}

impl RedisEventBus {
    /// Wrap an existing pool.
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventBus for RedisEventBus {
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), EventBusError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| EventBusError::connection(err.to_string()))?;
        let receivers: i64 = conn
            .publish(topic, payload)
            .await
            .map_err(|err| EventBusError::publish(topic, err.to_string()))?;
        debug!(topic, receivers, "published event to redis");
        Ok(())
    }

    async fn ping(&self) -> Result<(), EventBusError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|err| EventBusError::connection(err.to_string()))?;
        redis::cmd("PING")
            .query_async::<String>(&mut *conn)
            .await
            .map(|_| ())
            .map_err(|err| EventBusError::connection(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::outbound::redis_pool::RedisPoolConfig;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn unreachable_server_fails_ping() {
        let pool = RedisPool::new(
            &RedisPoolConfig::new("redis://127.0.0.1:1")
                .with_connection_timeout(Duration::from_millis(100)),
        )
        .expect("valid url");

        let err = RedisEventBus::new(pool)
            .ping()
            .await
            .expect_err("nothing listens on port 1");
        assert!(matches!(err, EventBusError::Connection { .. }));
    }
}
