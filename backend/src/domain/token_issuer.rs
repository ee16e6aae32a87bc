//! Signed, time-bounded bearer tokens.
//!
//! Tokens are HS256 JWTs carrying `{user_id, role, iat, exp}`. Validity is
//! decided only by the signature and the expiry: there is no server-side
//! record, revocation list, or replay protection. One shared secret signs
//! every token for the lifetime of the process.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use super::UserId;

/// Failures raised while issuing or verifying tokens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// The signing secret was empty.
    #[error("token signing secret must not be empty")]
    EmptySecret,
    /// Claims could not be built or signed.
    #[error("token signing failed: {message}")]
    Signing {
        /// Underlying failure description.
        message: String,
    },
    /// Signature mismatch, malformed token, or expiry reached.
    #[error("token is invalid or expired")]
    Invalid,
}

/// Opaque signed token string handed to clients.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    /// Wrap a raw token string, e.g. one read from an `Authorization` header.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Borrow the encoded token.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Take ownership of the encoded token.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(<redacted>)")
    }
}

/// Identity asserted by a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedClaims {
    /// Token subject.
    pub subject: UserId,
    /// Role at issuance time.
    pub role: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenClaims {
    user_id: i64,
    role: String,
    iat: i64,
    exp: i64,
}

/// Issues and verifies HS256 bearer tokens against an injected clock.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// use auth_service::domain::{TokenIssuer, UserId};
/// use mockable::DefaultClock;
///
/// let issuer = TokenIssuer::new(b"signing-secret", Arc::new(DefaultClock)).expect("secret");
/// let subject = UserId::new(7).expect("valid id");
/// let token = issuer
///     .issue(subject, "user", Duration::from_secs(60))
///     .expect("token");
/// let claims = issuer.verify(token.as_str()).expect("fresh token");
/// assert_eq!(claims.subject, subject);
/// ```
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    clock: Arc<dyn Clock>,
}

impl TokenIssuer {
    /// Build an issuer from the shared signing secret.
    pub fn new(secret: impl AsRef<[u8]>, clock: Arc<dyn Clock>) -> Result<Self, TokenError> {
        let secret = Zeroizing::new(secret.as_ref().to_vec());
        if secret.is_empty() {
            return Err(TokenError::EmptySecret);
        }
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the injected clock in `verify`.
        validation.validate_exp = false;
        validation.leeway = 0;
        Ok(Self {
            encoding_key: EncodingKey::from_secret(&secret),
            decoding_key: DecodingKey::from_secret(&secret),
            validation,
            clock,
        })
    }

    /// Sign a token for `subject` that expires `ttl` from now.
    pub fn issue(
        &self,
        subject: UserId,
        role: &str,
        ttl: Duration,
    ) -> Result<BearerToken, TokenError> {
        let ttl = TimeDelta::from_std(ttl).map_err(|err| TokenError::Signing {
            message: format!("token ttl out of range: {err}"),
        })?;
        let issued_at = self.clock.utc();
        let expires_at = issued_at
            .checked_add_signed(ttl)
            .ok_or_else(|| TokenError::Signing {
                message: "token expiry overflows the calendar".to_owned(),
            })?;
        let claims = TokenClaims {
            user_id: subject.get(),
            role: role.to_owned(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map(BearerToken)
            .map_err(|err| TokenError::Signing {
                message: err.to_string(),
            })
    }

    /// Verify the signature and expiry of `token`.
    ///
    /// Fails with [`TokenError::Invalid`] once the clock reaches `exp`.
    pub fn verify(&self, token: &str) -> Result<VerifiedClaims, TokenError> {
        let data = jsonwebtoken::decode::<TokenClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|_| TokenError::Invalid)?;
        let claims = data.claims;
        if self.clock.utc().timestamp() >= claims.exp {
            return Err(TokenError::Invalid);
        }
        let subject = UserId::new(claims.user_id).map_err(|_| TokenError::Invalid)?;
        Ok(VerifiedClaims {
            subject,
            role: claims.role,
        })
    }
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer").finish_non_exhaustive()
    }
}
