//! Domain cache key type shared by profile cache adapters.
use thiserror::Error;

use crate::domain::UserId;

/// Cache key used to store and retrieve user profiles.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProfileCacheKey(String);

impl ProfileCacheKey {
    /// Construct a cache key after validating that it is non-empty and trimmed.
    pub fn new(value: impl Into<String>) -> Result<Self, ProfileCacheKeyValidationError> {
        let raw = value.into();
        if raw.trim().is_empty() {
            return Err(ProfileCacheKeyValidationError::Empty);
        }
        if raw.chars().any(char::is_whitespace) {
            return Err(ProfileCacheKeyValidationError::ContainsWhitespace);
        }
        Ok(Self(raw))
    }

    /// Key under which the profile of `user_id` is cached (`user:<id>`).
    pub fn for_user(user_id: UserId) -> Self {
        Self(format!("user:{user_id}"))
    }

    /// Borrow the underlying key as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for ProfileCacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AsRef<str> for ProfileCacheKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Validation errors returned when constructing [`ProfileCacheKey`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProfileCacheKeyValidationError {
    /// Key is empty after trimming whitespace.
    #[error("profile cache key must not be empty")]
    Empty,
    /// Key contains whitespace.
    #[error("profile cache key must not contain whitespace")]
    ContainsWhitespace,
}
