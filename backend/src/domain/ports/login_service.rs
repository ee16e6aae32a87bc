//! Driving port for login/authentication use-cases.
//!
//! In hexagonal terms this is a *driving* port: inbound adapters call it to
//! exchange credentials for a bearer token, and to check tokens presented on
//! later requests, without knowing the backing infrastructure.

use async_trait::async_trait;

use crate::domain::{BearerToken, Deadline, Error, LoginCredentials, VerifiedClaims};

/// Domain use-case port for authentication.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and issue a bearer token.
    ///
    /// Unknown emails and wrong passwords fail with the same error.
    async fn login(
        &self,
        credentials: &LoginCredentials,
        deadline: Deadline,
    ) -> Result<BearerToken, Error>;

    /// Check a presented token's signature and expiry.
    fn authenticate(&self, token: &BearerToken) -> Result<VerifiedClaims, Error>;
}
