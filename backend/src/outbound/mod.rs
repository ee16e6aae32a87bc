//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: user stores (PostgreSQL via Diesel, or in-memory)
//! - **cache**: Redis backend for the shared profile cache
//! - **events**: Redis pub/sub event bus
//! - **redis_pool**: pool shared by the two Redis adapters
//! - **metrics**: Prometheus recorder (feature-gated)
//!
//! Adapters translate between domain types and infrastructure representations
//! and contain no business logic.

pub mod cache;
pub mod events;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod persistence;
pub mod redis_pool;
