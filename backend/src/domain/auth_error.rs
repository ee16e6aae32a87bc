//! Typed failures of the auth orchestrator and their transport mapping.

use super::{CredentialValidationError, Error, UserId};

/// Failures returned by [`AuthService`](super::AuthService) operations.
///
/// Cache and publication failures never appear here; they are absorbed
/// where they happen.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// Password (or email) was empty.
    #[error("credentials must not be empty")]
    EmptyCredential,
    /// Email address already belongs to another user.
    #[error("email address is already registered")]
    DuplicateEmail,
    /// Unknown email or wrong password; deliberately indistinguishable.
    #[error("invalid credentials")]
    InvalidCredential,
    /// Bearer token failed signature or expiry checks.
    #[error("invalid or expired token")]
    TokenInvalid,
    /// No user with the requested id.
    #[error("user {id} not found")]
    UserNotFound {
        /// Requested id.
        id: UserId,
    },
    /// Password hashing failed internally.
    #[error("password hashing failed: {message}")]
    HashingFailure {
        /// Underlying failure description.
        message: String,
    },
    /// Token could not be signed.
    #[error("token issuance failed: {message}")]
    TokenFailure {
        /// Underlying failure description.
        message: String,
    },
    /// User store failed the query.
    #[error("user store failed: {message}")]
    PersistenceFailure {
        /// Underlying failure description.
        message: String,
    },
    /// User store could not be reached.
    #[error("user store unavailable: {message}")]
    StoreUnavailable {
        /// Underlying failure description.
        message: String,
    },
    /// A store call did not finish before the request deadline.
    #[error("{operation} exceeded the request deadline")]
    Timeout {
        /// Name of the bounded operation.
        operation: &'static str,
    },
}

impl From<CredentialValidationError> for AuthError {
    fn from(_: CredentialValidationError) -> Self {
        Self::EmptyCredential
    }
}

impl From<AuthError> for Error {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::EmptyCredential => Self::invalid_request("credentials must not be empty"),
            AuthError::DuplicateEmail => Self::conflict("email address is already registered"),
            AuthError::InvalidCredential => Self::unauthorized("invalid credentials"),
            AuthError::TokenInvalid => Self::unauthorized("invalid or expired token"),
            AuthError::UserNotFound { id } => Self::not_found(format!("user {id} not found")),
            AuthError::Timeout { .. } => Self::timeout("request deadline exceeded"),
            AuthError::StoreUnavailable { .. } => {
                Self::service_unavailable("user store unavailable")
            }
            other @ (AuthError::HashingFailure { .. }
            | AuthError::TokenFailure { .. }
            | AuthError::PersistenceFailure { .. }) => Self::internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(AuthError::EmptyCredential, ErrorCode::InvalidRequest)]
    #[case(AuthError::DuplicateEmail, ErrorCode::Conflict)]
    #[case(AuthError::InvalidCredential, ErrorCode::Unauthorized)]
    #[case(AuthError::TokenInvalid, ErrorCode::Unauthorized)]
    #[case(
        AuthError::UserNotFound { id: UserId::new(3).expect("valid id") },
        ErrorCode::NotFound
    )]
    #[case(AuthError::Timeout { operation: "find_by_id" }, ErrorCode::Timeout)]
    #[case(
        AuthError::StoreUnavailable { message: "pool closed".to_owned() },
        ErrorCode::ServiceUnavailable
    )]
    #[case(
        AuthError::HashingFailure { message: "rng".to_owned() },
        ErrorCode::InternalError
    )]
    #[case(
        AuthError::TokenFailure { message: "sign".to_owned() },
        ErrorCode::InternalError
    )]
    #[case(
        AuthError::PersistenceFailure { message: "syntax".to_owned() },
        ErrorCode::InternalError
    )]
    fn maps_to_transport_codes(#[case] error: AuthError, #[case] expected: ErrorCode) {
        assert_eq!(Error::from(error).code(), expected);
    }

    #[rstest]
    fn invalid_credentials_message_is_generic() {
        assert_eq!(
            Error::from(AuthError::InvalidCredential).message(),
            "invalid credentials"
        );
    }

    #[rstest]
    #[case(CredentialValidationError::EmptyPassword)]
    #[case(CredentialValidationError::EmptyEmail)]
    fn credential_validation_maps_to_empty_credential(#[case] error: CredentialValidationError) {
        assert_eq!(AuthError::from(error), AuthError::EmptyCredential);
    }
}
