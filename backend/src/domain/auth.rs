//! Credential primitives: passwords, stored hashes, and request objects.
//!
//! Field-level policy (username shape, email syntax, password strength) is
//! enforced by inbound adapters. The domain only refuses empty passwords so a
//! blank secret can never be hashed and stored.

use std::fmt;

use zeroize::Zeroizing;

use super::user::{DEFAULT_ROLE, NewUser, UserIdentity};

/// Domain error returned when credential values are unusable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialValidationError {
    /// Password was empty.
    #[error("password must not be empty")]
    EmptyPassword,
    /// Email was blank once trimmed.
    #[error("email must not be empty")]
    EmptyEmail,
}

/// Plaintext password wiped from memory on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Wrap a plaintext password, rejecting empty input.
    ///
    /// Whitespace is preserved to avoid surprising credential comparisons.
    pub fn new(raw: &str) -> Result<Self, CredentialValidationError> {
        if raw.is_empty() {
            return Err(CredentialValidationError::EmptyPassword);
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    /// Borrow the plaintext for hashing or verification.
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Opaque PHC-formatted password hash.
///
/// Never serialised, cached, or logged; `Debug` output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap a hash string produced by the credential hasher or the store.
    pub fn new(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    /// Borrow the PHC string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

/// Identity and stored hash as returned by a credential lookup.
///
/// Only crosses the store boundary into the orchestrator's login path; it is
/// never returned to callers or cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialRecord {
    /// Identity owning the credential.
    pub identity: UserIdentity,
    /// Stored PHC hash.
    pub password_hash: PasswordHash,
}

/// Validated registration request.
///
/// # Examples
/// ```
/// use auth_service::domain::Registration;
///
/// let registration = Registration::try_from_parts("alice", "alice@x.com", "Secret123", "")
///     .expect("valid registration");
/// assert_eq!(registration.draft().role, "user");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    draft: NewUser,
    password: Password,
}

impl Registration {
    /// Build a registration from raw request parts.
    ///
    /// The email is trimmed and a blank role falls back to [`DEFAULT_ROLE`].
    pub fn try_from_parts(
        username: &str,
        email: &str,
        password: &str,
        role: &str,
    ) -> Result<Self, CredentialValidationError> {
        let password = Password::new(password)?;
        let email = email.trim();
        if email.is_empty() {
            return Err(CredentialValidationError::EmptyEmail);
        }
        let role = match role.trim() {
            "" => DEFAULT_ROLE,
            other => other,
        };
        Ok(Self {
            draft: NewUser {
                username: username.trim().to_owned(),
                email: email.to_owned(),
                role: role.to_owned(),
            },
            password,
        })
    }

    /// Identity fields to persist.
    pub fn draft(&self) -> &NewUser {
        &self.draft
    }

    /// Plaintext password to hash.
    pub fn password(&self) -> &Password {
        &self.password
    }
}

/// Validated login credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Password,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialValidationError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(CredentialValidationError::EmptyEmail);
        }
        let password = Password::new(password)?;
        Ok(Self {
            email: email.to_owned(),
            password,
        })
    }

    /// Email used for the credential lookup.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password supplied by the caller.
    pub fn password(&self) -> &Password {
        &self.password
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("alice@x.com", "", CredentialValidationError::EmptyPassword)]
    #[case("   ", "pw", CredentialValidationError::EmptyEmail)]
    fn login_credentials_reject_blank_parts(
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: CredentialValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(email, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn registration_rejects_empty_password() {
        let err = Registration::try_from_parts("alice", "alice@x.com", "", "user")
            .expect_err("empty password must fail");
        assert_eq!(err, CredentialValidationError::EmptyPassword);
    }

    #[rstest]
    #[case("", "user")]
    #[case("  ", "user")]
    #[case("admin", "admin")]
    fn registration_defaults_blank_role(#[case] role: &str, #[case] expected: &str) {
        let registration = Registration::try_from_parts("alice", " alice@x.com ", "pw", role)
            .expect("valid registration");
        assert_eq!(registration.draft().role, expected);
        assert_eq!(registration.draft().email, "alice@x.com");
    }

    #[rstest]
    fn password_and_hash_debug_are_redacted() {
        let password = Password::new("Secret123").expect("non-empty password");
        let hash = PasswordHash::new("$argon2id$v=19$m=8,t=1,p=1$c2FsdA$aGFzaA");

        assert!(!format!("{password:?}").contains("Secret123"));
        assert!(!format!("{hash:?}").contains("argon2id"));
    }

    #[rstest]
    fn password_preserves_whitespace() {
        let password = Password::new("  spaced  ").expect("non-empty password");
        assert_eq!(password.expose(), "  spaced  ");
    }
}
