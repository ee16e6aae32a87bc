//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod auth_metrics;
mod cache_key;
mod event_bus;
mod login_service;
mod shared_cache_backend;
mod user_profile_query;
mod user_registration;
mod user_store;

#[cfg(test)]
pub use auth_metrics::MockAuthMetrics;
pub use auth_metrics::{
    AuthCounter, AuthHistogram, AuthMetrics, NoOpAuthMetrics, StoreOperation,
};
pub use cache_key::{ProfileCacheKey, ProfileCacheKeyValidationError};
#[cfg(test)]
pub use event_bus::MockEventBus;
pub use event_bus::{EventBus, EventBusError};
pub use login_service::LoginService;
#[cfg(test)]
pub use login_service::MockLoginService;
#[cfg(test)]
pub use shared_cache_backend::MockSharedCacheBackend;
pub use shared_cache_backend::{SharedCacheBackend, SharedCacheError};
#[cfg(test)]
pub use user_profile_query::MockUserProfileQuery;
pub use user_profile_query::UserProfileQuery;
#[cfg(test)]
pub use user_registration::MockUserRegistration;
pub use user_registration::UserRegistration;
#[cfg(test)]
pub use user_store::MockUserStore;
pub use user_store::{UserStore, UserStoreError};
