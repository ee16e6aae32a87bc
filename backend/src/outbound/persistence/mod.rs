//! User store adapters.
//!
//! - [`DieselUserStore`]: PostgreSQL via Diesel with `diesel-async` and `bb8`
//!   pooling. Row structs (`models.rs`) and the table definition
//!   (`schema.rs`) stay private to this module.
//! - [`InMemoryUserStore`]: process-local store used when no database URL is
//!   configured.
//!
//! # Example
//!
//! ```no_run
//! # async fn demo() -> Result<(), auth_service::outbound::persistence::PoolError> {
//! use auth_service::outbound::persistence::{DbPool, DieselUserStore, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/auth")).await?;
//! let store = DieselUserStore::new(pool);
//! # let _ = store;
//! # Ok(())
//! # }
//! ```

mod diesel_user_store;
mod in_memory_user_store;
mod models;
mod pool;
mod schema;

pub use diesel_user_store::DieselUserStore;
pub use in_memory_user_store::InMemoryUserStore;
pub use pool::{DbPool, PoolConfig, PoolError};
