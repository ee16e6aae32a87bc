//! Driving port for user registration.

use async_trait::async_trait;

use crate::domain::{Deadline, Error, Registration, UserIdentity};

/// Domain use-case port for creating accounts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRegistration: Send + Sync {
    /// Register a user and return the stored identity.
    async fn register(
        &self,
        registration: &Registration,
        deadline: Deadline,
    ) -> Result<UserIdentity, Error>;
}
