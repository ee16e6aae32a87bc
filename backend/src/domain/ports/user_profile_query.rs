//! Driving port for user profile queries.
//!
//! Inbound adapters use this port to load a profile without importing cache
//! or persistence details.

use async_trait::async_trait;

use crate::domain::{Deadline, Error, UserId, UserIdentity};

/// Domain use-case port for reading a user's profile.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserProfileQuery: Send + Sync {
    /// Return the profile for `user_id`.
    async fn fetch_profile(&self, user_id: UserId, deadline: Deadline)
    -> Result<UserIdentity, Error>;
}
