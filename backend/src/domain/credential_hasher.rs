//! One-way password hashing and verification.
//!
//! Hashes are Argon2id PHC strings with a per-hash random salt. The cost is
//! fixed when the hasher is built; changing it needs a redeploy. Stored hashes
//! keep their own parameters, so verification still works for hashes created
//! under an older cost.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use async_trait::async_trait;

use super::{Password, PasswordHash};

/// Failures raised by credential hashers.
///
/// Messages never contain the plaintext or the hash.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialHasherError {
    /// Cost parameters were rejected when building the hasher.
    #[error("invalid hashing cost: {message}")]
    InvalidCost {
        /// Parameter validation message.
        message: String,
    },
    /// Salt generation or hashing failed.
    #[error("password hashing failed: {message}")]
    HashingFailure {
        /// Underlying failure description.
        message: String,
    },
    /// The stored hash could not be parsed or carries unusable parameters.
    #[error("stored password hash is malformed")]
    VerificationFailure,
}

/// Argon2 cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingCost {
    /// Memory in KiB.
    pub memory_kib: u32,
    /// Number of passes.
    pub iterations: u32,
    /// Degree of parallelism.
    pub parallelism: u32,
}

impl HashingCost {
    /// OWASP baseline for Argon2id: 19 MiB, two passes, one lane.
    pub const DEFAULT: Self = Self {
        memory_kib: 19 * 1024,
        iterations: 2,
        parallelism: 1,
    };
}

impl Default for HashingCost {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Slow, salted password hashing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialHasher: Send + Sync {
    /// Hash `password` with a fresh salt.
    async fn hash(&self, password: &Password) -> Result<PasswordHash, CredentialHasherError>;

    /// Check `password` against `hash`.
    ///
    /// Returns `Ok(false)` on mismatch and
    /// [`CredentialHasherError::VerificationFailure`] only when `hash` is
    /// malformed.
    async fn verify(
        &self,
        password: &Password,
        hash: &PasswordHash,
    ) -> Result<bool, CredentialHasherError>;
}

/// Argon2id hasher running on the blocking thread pool.
///
/// # Examples
/// ```
/// use auth_service::domain::{Argon2CredentialHasher, CredentialHasher, HashingCost, Password};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let hasher = Argon2CredentialHasher::new(HashingCost {
///     memory_kib: 8,
///     iterations: 1,
///     parallelism: 1,
/// })
/// .expect("valid cost");
/// let password = Password::new("Secret123").expect("non-empty");
/// let hash = hasher.hash(&password).await.expect("hash");
/// assert!(hasher.verify(&password, &hash).await.expect("well-formed hash"));
/// # });
/// ```
#[derive(Clone)]
pub struct Argon2CredentialHasher {
    argon2: Argon2<'static>,
    cost: HashingCost,
}

impl Argon2CredentialHasher {
    /// Build a hasher, validating the cost parameters.
    pub fn new(cost: HashingCost) -> Result<Self, CredentialHasherError> {
        let params = Params::new(cost.memory_kib, cost.iterations, cost.parallelism, None)
            .map_err(|err| CredentialHasherError::InvalidCost {
                message: err.to_string(),
            })?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            cost,
        })
    }

    /// Cost fixed at construction.
    pub fn cost(&self) -> HashingCost {
        self.cost
    }
}

impl std::fmt::Debug for Argon2CredentialHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Argon2CredentialHasher")
            .field("cost", &self.cost)
            .finish_non_exhaustive()
    }
}

fn hash_blocking(
    argon2: &Argon2<'_>,
    password: &Password,
) -> Result<PasswordHash, CredentialHasherError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = argon2
        .hash_password(password.expose().as_bytes(), &salt)
        .map_err(|err| CredentialHasherError::HashingFailure {
            message: err.to_string(),
        })?;
    Ok(PasswordHash::new(hash.to_string()))
}

fn verify_blocking(
    argon2: &Argon2<'_>,
    password: &Password,
    hash: &PasswordHash,
) -> Result<bool, CredentialHasherError> {
    let parsed = password_hash::PasswordHash::new(hash.as_str())
        .map_err(|_| CredentialHasherError::VerificationFailure)?;
    if parsed.salt.is_none() || parsed.hash.is_none() {
        return Err(CredentialHasherError::VerificationFailure);
    }
    match argon2.verify_password(password.expose().as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(_) => Err(CredentialHasherError::VerificationFailure),
    }
}

/// A panicked or cancelled worker says nothing about the stored hash.
fn task_failure(err: tokio::task::JoinError) -> CredentialHasherError {
    CredentialHasherError::HashingFailure {
        message: err.to_string(),
    }
}

#[async_trait]
impl CredentialHasher for Argon2CredentialHasher {
    async fn hash(&self, password: &Password) -> Result<PasswordHash, CredentialHasherError> {
        let argon2 = self.argon2.clone();
        let password = password.clone();
        tokio::task::spawn_blocking(move || hash_blocking(&argon2, &password))
            .await
            .map_err(task_failure)?
    }

    async fn verify(
        &self,
        password: &Password,
        hash: &PasswordHash,
    ) -> Result<bool, CredentialHasherError> {
        let argon2 = self.argon2.clone();
        let password = password.clone();
        let hash = hash.clone();
        tokio::task::spawn_blocking(move || verify_blocking(&argon2, &password, &hash))
            .await
            .map_err(task_failure)?
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn hasher() -> Argon2CredentialHasher {
        Argon2CredentialHasher::new(HashingCost {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        })
        .expect("cheap test cost")
    }

    fn password(raw: &str) -> Password {
        Password::new(raw).expect("non-empty password")
    }

    #[rstest]
    #[tokio::test]
    async fn verify_accepts_original_password(hasher: Argon2CredentialHasher) {
        let secret = password("Secret123");
        let hash = hasher.hash(&secret).await.expect("hash");

        assert!(hash.as_str().starts_with("$argon2id$"));
        assert!(hasher.verify(&secret, &hash).await.expect("well-formed"));
    }

    #[rstest]
    #[tokio::test]
    async fn verify_rejects_other_password(hasher: Argon2CredentialHasher) {
        let hash = hasher.hash(&password("Secret123")).await.expect("hash");
        let matched = hasher
            .verify(&password("wrong"), &hash)
            .await
            .expect("well-formed");
        assert!(!matched);
    }

    #[rstest]
    #[tokio::test]
    async fn hashing_is_salted(hasher: Argon2CredentialHasher) {
        let secret = password("Secret123");
        let first = hasher.hash(&secret).await.expect("hash");
        let second = hasher.hash(&secret).await.expect("hash");
        assert_ne!(first, second);
    }

    #[rstest]
    #[case("")]
    #[case("not-a-phc-string")]
    #[case("$argon2id$v=19$broken")]
    #[case("$argon2id$v=19$m=8,t=1,p=1$c2FsdHNhbHQ")]
    #[case("$argon2id$v=19$m=1,t=0,p=1$c2FsdHNhbHQ$aGFzaGhhc2hoYXNoaGFzaA")]
    #[tokio::test]
    async fn malformed_hash_is_a_verification_failure(
        hasher: Argon2CredentialHasher,
        #[case] stored: &str,
    ) {
        let err = hasher
            .verify(&password("Secret123"), &PasswordHash::new(stored))
            .await
            .expect_err("malformed hash");
        assert_eq!(err, CredentialHasherError::VerificationFailure);
    }

    #[rstest]
    #[tokio::test]
    async fn verifies_hashes_made_under_another_cost(hasher: Argon2CredentialHasher) {
        let stronger = Argon2CredentialHasher::new(HashingCost {
            memory_kib: 16,
            iterations: 2,
            parallelism: 1,
        })
        .expect("valid cost");
        let secret = password("Secret123");
        let hash = stronger.hash(&secret).await.expect("hash");
        assert!(hasher.verify(&secret, &hash).await.expect("well-formed"));
    }

    #[rstest]
    #[tokio::test]
    async fn panicked_worker_is_a_hashing_failure() {
        let join_error = tokio::task::spawn_blocking::<_, ()>(|| panic!("worker died"))
            .await
            .expect_err("task panicked");

        assert!(matches!(
            task_failure(join_error),
            CredentialHasherError::HashingFailure { .. }
        ));
    }

    #[rstest]
    fn rejects_invalid_cost() {
        let err = Argon2CredentialHasher::new(HashingCost {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        })
        .expect_err("zero iterations");
        assert!(matches!(err, CredentialHasherError::InvalidCost { .. }));
    }
}
