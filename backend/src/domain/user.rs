//! User identity model.
//!
//! Identities are owned by the persistence layer; the domain only receives
//! immutable copies and never mutates them. Password hashes live beside the
//! identity inside the store and never travel with it.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Validation errors returned by [`UserId::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum UserIdValidationError {
    /// Identifiers start at one; zero and negatives are never assigned.
    #[error("user id must be a positive integer, got {value}")]
    NotPositive {
        /// Rejected raw value.
        value: i64,
    },
}

/// Store-assigned numeric user identifier.
///
/// ## Invariants
/// - The wrapped value is `>= 1`. Absence is modelled with `Option`, never a
///   zero sentinel.
///
/// # Examples
/// ```
/// use auth_service::domain::UserId;
///
/// let id = UserId::new(42).expect("positive id");
/// assert_eq!(id.get(), 42);
/// assert!(UserId::new(0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct UserId(i64);

impl UserId {
    /// Validate and wrap a raw identifier.
    pub fn new(value: i64) -> Result<Self, UserIdValidationError> {
        if value < 1 {
            return Err(UserIdValidationError::NotPositive { value });
        }
        Ok(Self(value))
    }

    /// Raw numeric value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<UserId> for i64 {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<i64> for UserId {
    type Error = UserIdValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Role assigned to newly registered users when none is supplied.
pub const DEFAULT_ROLE: &str = "user";

/// Registration draft handed to the user store alongside the password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Chosen username.
    pub username: String,
    /// Email address; unique across the store.
    pub email: String,
    /// Free-text role label.
    pub role: String,
}

/// Immutable identity record returned by the store.
///
/// Serialised as camelCase JSON for the shared profile cache and HTTP
/// responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    #[schema(value_type = i64, example = 42)]
    id: UserId,
    #[schema(example = "alice")]
    username: String,
    #[schema(example = "alice@example.com")]
    email: String,
    #[schema(example = "user")]
    role: String,
    created_at: DateTime<Utc>,
}

impl UserIdentity {
    /// Assemble an identity from store-provided parts.
    pub fn new(id: UserId, draft: NewUser, created_at: DateTime<Utc>) -> Self {
        let NewUser {
            username,
            email,
            role,
        } = draft;
        Self {
            id,
            username,
            email,
            role,
            created_at,
        }
    }

    /// Store-assigned identifier.
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Username chosen at registration.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Unique email address.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Role label embedded in issued tokens.
    pub fn role(&self) -> &str {
        &self.role
    }

    /// Creation timestamp recorded by the store.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
