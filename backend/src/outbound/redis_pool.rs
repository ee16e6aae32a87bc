//! Shared Redis connection pool for the cache and event bus adapters.
//!
//! Wraps `bb8-redis` so both adapters check out multiplexed connections from
//! one pool per URL. Building the pool does not contact Redis; reachability is
//! decided later by each adapter's `ping`.

use std::time::Duration;

use bb8_redis::RedisConnectionManager;
use bb8_redis::bb8::{Pool, PooledConnection};

use crate::domain::ports::define_port_error;

define_port_error! {
    /// Failures building the Redis pool or checking out a connection.
    pub enum RedisPoolError {
        Checkout { message: String } => "failed to get redis connection from pool: {message}",
        Build { message: String } => "failed to build redis connection pool: {message}",
    }
}

/// Configuration for a Redis connection pool.
#[derive(Debug, Clone)]
pub struct RedisPoolConfig {
    redis_url: String,
    max_size: u32,
    connection_timeout: Duration,
}

impl RedisPoolConfig {
    /// Create a configuration for `redis_url`.
    ///
    /// Defaults: 16 connections, 2 second checkout timeout.
    pub fn new(redis_url: impl Into<String>) -> Self {
        Self {
            redis_url: redis_url.into(),
            max_size: 16,
            connection_timeout: Duration::from_secs(2),
        }
    }

    /// Set the maximum number of connections in the pool.
    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size;
        self
    }

    /// Set the connection checkout timeout.
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    /// Get the Redis URL.
    pub fn redis_url(&self) -> &str {
        &self.redis_url
    }
}

/// Lazily connecting Redis pool.
#[derive(Clone)]
pub struct RedisPool {
    inner: Pool<RedisConnectionManager>,
}

impl RedisPool {
    /// Build a pool without opening connections up front.
    ///
    /// Must be called inside a tokio runtime; the pool spawns its reaper task.
    ///
    /// # Errors
    ///
    /// Returns `RedisPoolError::Build` if the URL cannot be parsed.
    pub fn new(config: &RedisPoolConfig) -> Result<Self, RedisPoolError> {
        let manager = RedisConnectionManager::new(config.redis_url.as_str())
            .map_err(|err| RedisPoolError::build(err.to_string()))?;
        let pool = Pool::builder()
            .max_size(config.max_size)
            .connection_timeout(config.connection_timeout)
            .build_unchecked(manager);
        Ok(Self { inner: pool })
    }

    /// Get a connection from the pool.
    ///
    /// # Errors
    ///
    /// Returns `RedisPoolError::Checkout` if a connection cannot be obtained
    /// within the configured timeout.
    pub async fn get(&self) -> Result<PooledConnection<'_, RedisConnectionManager>, RedisPoolError> {
        self.inner
            .get()
            .await
            .map_err(|err| RedisPoolError::checkout(err.to_string()))
    }
}
