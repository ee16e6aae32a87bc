//! Port abstraction for user persistence adapters and their errors.
//!
//! The store owns identities and their password hashes. The orchestrator
//! treats rows as opaque records reached only through this interface.
use async_trait::async_trait;

use crate::domain::{CredentialRecord, NewUser, PasswordHash, UserId, UserIdentity};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user store adapters.
    pub enum UserStoreError {
        /// Another user already holds the email address.
        DuplicateEmail => "email address is already registered",
        /// Store connection could not be established.
        Connection { message: String } => "user store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user store query failed: {message}",
    }
}

/// Port for creating users and reading identities and credentials.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persist a new user with its password hash and return the stored
    /// identity, including the assigned id and creation timestamp.
    async fn create_user(
        &self,
        draft: &NewUser,
        password_hash: &PasswordHash,
    ) -> Result<UserIdentity, UserStoreError>;

    /// Look up the credential record for an email address.
    async fn find_by_email(&self, email: &str)
    -> Result<Option<CredentialRecord>, UserStoreError>;

    /// Look up an identity by id.
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserIdentity>, UserStoreError>;
}
