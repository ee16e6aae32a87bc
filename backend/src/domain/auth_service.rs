//! Auth orchestrator: register, login, and profile lookup.
//!
//! This module composes the credential hasher, token issuer, profile cache,
//! and notifier over the user store port, and implements the driving ports
//! used by inbound adapters.
//!
//! Store calls run on their own task and are awaited until the request
//! deadline. A timed-out call keeps running so that effects which cannot be
//! rolled back still complete. Cache writes are awaited before a profile is
//! returned and event publication runs on a detached task. Failures of
//! either are logged and counted, never returned.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use crate::domain::ports::{
    AuthCounter, AuthHistogram, AuthMetrics, LoginService, ProfileCacheKey, StoreOperation,
    UserProfileQuery, UserRegistration, UserStore, UserStoreError,
};
use crate::domain::{
    AuthError, BearerToken, CacheMode, CallError, CredentialHasher, CredentialHasherError,
    Deadline, DomainEvent, Error, EventNotifier, LoginCredentials, ProfileCache, Registration,
    TokenIssuer, TraceId, UserId, UserIdentity, VerifiedClaims, run_to_completion, within,
};

/// Default lifetime of issued tokens.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Parameter object bundling the collaborators of [`AuthService`].
#[derive(Clone)]
pub struct AuthServicePorts {
    pub store: Arc<dyn UserStore>,
    pub hasher: Arc<dyn CredentialHasher>,
    pub tokens: Arc<TokenIssuer>,
    pub cache: Arc<dyn ProfileCache>,
    pub notifier: Arc<EventNotifier>,
    pub metrics: Arc<dyn AuthMetrics>,
}

/// Orchestrates registration, login, and profile reads.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
    hasher: Arc<dyn CredentialHasher>,
    tokens: Arc<TokenIssuer>,
    cache: Arc<dyn ProfileCache>,
    notifier: Arc<EventNotifier>,
    metrics: Arc<dyn AuthMetrics>,
    token_ttl: Duration,
}

impl AuthService {
    /// Create a service issuing tokens valid for `token_ttl`.
    pub fn new(ports: AuthServicePorts, token_ttl: Duration) -> Self {
        let AuthServicePorts {
            store,
            hasher,
            tokens,
            cache,
            notifier,
            metrics,
        } = ports;
        Self {
            store,
            hasher,
            tokens,
            cache,
            notifier,
            metrics,
            token_ttl,
        }
    }

    /// Mode of the profile cache chosen at startup.
    pub fn cache_mode(&self) -> CacheMode {
        self.cache.mode()
    }

    /// Whether registration events reach a bus.
    pub fn notifier_enabled(&self) -> bool {
        self.notifier.is_enabled()
    }

    /// Hash the password, persist the user, and announce the registration.
    ///
    /// The returned identity never carries the hash. Publication happens after
    /// the user is persisted and its outcome does not affect the result.
    pub async fn register(
        &self,
        registration: &Registration,
        deadline: Deadline,
    ) -> Result<UserIdentity, AuthError> {
        let password_hash = self
            .hasher
            .hash(registration.password())
            .await
            .map_err(|err| {
                error!(error = %err, "password hashing failed during registration");
                AuthError::HashingFailure {
                    message: err.to_string(),
                }
            })?;

        let store = Arc::clone(&self.store);
        let draft = registration.draft().clone();
        let created = self
            .store_call(StoreOperation::CreateUser, deadline, async move {
                store.create_user(&draft, &password_hash).await
            })
            .await?;

        self.metrics.increment(AuthCounter::Registration);
        info!(user_id = %created.id(), "user registered");
        self.spawn_publish(DomainEvent::user_registered(&created), deadline);
        Ok(created)
    }

    /// Check credentials and issue a bearer token.
    ///
    /// Unknown emails, wrong passwords, and unreadable stored hashes all fail
    /// with [`AuthError::InvalidCredential`].
    pub async fn login(
        &self,
        credentials: &LoginCredentials,
        deadline: Deadline,
    ) -> Result<BearerToken, AuthError> {
        let store = Arc::clone(&self.store);
        let email = credentials.email().to_owned();
        let record = self
            .store_call(StoreOperation::FindByEmail, deadline, async move {
                store.find_by_email(&email).await
            })
            .await?;

        let Some(record) = record else {
            return Err(self.reject_login(None, "no user with this email"));
        };
        let user_id = record.identity.id();

        match self
            .hasher
            .verify(credentials.password(), &record.password_hash)
            .await
        {
            Ok(true) => {}
            Ok(false) => return Err(self.reject_login(Some(user_id), "password mismatch")),
            Err(CredentialHasherError::VerificationFailure) => {
                error!(%user_id, "stored password hash is malformed");
                return Err(self.reject_login(Some(user_id), "malformed stored hash"));
            }
            Err(err) => {
                error!(%user_id, error = %err, "password verification failed");
                return Err(AuthError::HashingFailure {
                    message: err.to_string(),
                });
            }
        }

        let token = self
            .tokens
            .issue(user_id, record.identity.role(), self.token_ttl)
            .map_err(|err| {
                error!(%user_id, error = %err, "token issuance failed");
                AuthError::TokenFailure {
                    message: err.to_string(),
                }
            })?;
        self.metrics.increment(AuthCounter::LoginSuccess);
        info!(%user_id, "login succeeded");
        Ok(token)
    }

    /// Verify a bearer token presented by a client.
    pub fn verify_token(&self, token: &BearerToken) -> Result<VerifiedClaims, AuthError> {
        self.tokens.verify(token.as_str()).map_err(|err| {
            debug!(error = %err, "bearer token rejected");
            AuthError::TokenInvalid
        })
    }

    /// Read a profile through the cache.
    ///
    /// Cache failures and cache timeouts count as misses. On a miss the
    /// profile is fetched from the store and written back before returning,
    /// so an immediate second read is a hit.
    pub async fn get_profile(
        &self,
        user_id: UserId,
        deadline: Deadline,
    ) -> Result<UserIdentity, AuthError> {
        let key = ProfileCacheKey::for_user(user_id);
        if let Some(identity) = self.read_cache(&key, deadline).await {
            return Ok(identity);
        }

        let store = Arc::clone(&self.store);
        let identity = self
            .store_call(StoreOperation::FindById, deadline, async move {
                store.find_by_id(user_id).await
            })
            .await?
            .ok_or(AuthError::UserNotFound { id: user_id })?;

        self.write_cache(&key, &identity, deadline).await;
        Ok(identity)
    }

    async fn read_cache(&self, key: &ProfileCacheKey, deadline: Deadline) -> Option<UserIdentity> {
        let mode = self.cache.mode().as_str();
        match within(deadline, "profile_cache.get", self.cache.get(key)).await {
            Ok(Ok(Some(identity))) => {
                self.metrics.increment(AuthCounter::CacheHit);
                debug!(%key, mode, "profile cache hit");
                Some(identity)
            }
            Ok(Ok(None)) => {
                self.metrics.increment(AuthCounter::CacheMiss);
                debug!(%key, mode, "profile cache miss");
                None
            }
            Ok(Err(err)) => {
                self.metrics.increment(AuthCounter::CacheFailure);
                warn!(%key, mode, error = %err, "profile cache read failed; reading through");
                None
            }
            Err(err) => {
                self.metrics.increment(AuthCounter::CacheFailure);
                warn!(%key, mode, error = %err, "profile cache read timed out; reading through");
                None
            }
        }
    }

    async fn write_cache(
        &self,
        key: &ProfileCacheKey,
        identity: &UserIdentity,
        deadline: Deadline,
    ) {
        let outcome = within(deadline, "profile_cache.put", self.cache.put(key, identity)).await;
        let failure = match outcome {
            Ok(Ok(())) => return,
            Ok(Err(err)) => err.to_string(),
            Err(err) => err.to_string(),
        };
        self.metrics.increment(AuthCounter::CacheFailure);
        warn!(%key, error = %failure, "profile cache write failed");
    }

    fn spawn_publish(&self, event: DomainEvent, deadline: Deadline) {
        let notifier = Arc::clone(&self.notifier);
        let metrics = Arc::clone(&self.metrics);
        tokio::spawn(TraceId::propagate(async move {
            let outcome = within(deadline, "event.publish", notifier.publish(&event)).await;
            let failure = match outcome {
                Ok(Ok(())) => return,
                Ok(Err(err)) => err.to_string(),
                Err(err) => err.to_string(),
            };
            metrics.increment(AuthCounter::PublishFailure);
            warn!(topic = event.topic(), error = %failure, "domain event publication failed");
        }));
    }

    fn reject_login(&self, user_id: Option<UserId>, reason: &'static str) -> AuthError {
        self.metrics.increment(AuthCounter::LoginRejected);
        debug!(user_id = ?user_id.map(UserId::get), reason, "login rejected");
        AuthError::InvalidCredential
    }

    async fn store_call<T, F>(
        &self,
        operation: StoreOperation,
        deadline: Deadline,
        call: F,
    ) -> Result<T, AuthError>
    where
        F: Future<Output = Result<T, UserStoreError>> + Send + 'static,
        T: Send + 'static,
    {
        let metrics = Arc::clone(&self.metrics);
        let timed = async move {
            let started = Instant::now();
            let result = call.await;
            metrics.observe(AuthHistogram::StoreCall(operation), started.elapsed());
            result
        };
        match run_to_completion(deadline, operation.label(), timed).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(Self::map_store_error(operation, err)),
            Err(CallError::Timeout { operation: label }) => {
                warn!(operation = label, "user store call exceeded the request deadline");
                Err(AuthError::Timeout { operation: label })
            }
            Err(CallError::Aborted { operation: label, message }) => {
                error!(operation = label, error = %message, "user store task aborted");
                Err(AuthError::PersistenceFailure { message })
            }
        }
    }

    fn map_store_error(operation: StoreOperation, err: UserStoreError) -> AuthError {
        match err {
            UserStoreError::DuplicateEmail => AuthError::DuplicateEmail,
            UserStoreError::Connection { message } => {
                error!(operation = operation.label(), error = %message, "user store unavailable");
                AuthError::StoreUnavailable { message }
            }
            UserStoreError::Query { message } => {
                error!(operation = operation.label(), error = %message, "user store query failed");
                AuthError::PersistenceFailure { message }
            }
        }
    }
}

#[async_trait]
impl UserRegistration for AuthService {
    async fn register(
        &self,
        registration: &Registration,
        deadline: Deadline,
    ) -> Result<UserIdentity, Error> {
        Self::register(self, registration, deadline)
            .await
            .map_err(Error::from)
    }
}

#[async_trait]
impl LoginService for AuthService {
    async fn login(
        &self,
        credentials: &LoginCredentials,
        deadline: Deadline,
    ) -> Result<BearerToken, Error> {
        Self::login(self, credentials, deadline)
            .await
            .map_err(Error::from)
    }

    fn authenticate(&self, token: &BearerToken) -> Result<VerifiedClaims, Error> {
        self.verify_token(token).map_err(Error::from)
    }
}

#[async_trait]
impl UserProfileQuery for AuthService {
    async fn fetch_profile(
        &self,
        user_id: UserId,
        deadline: Deadline,
    ) -> Result<UserIdentity, Error> {
        self.get_profile(user_id, deadline).await.map_err(Error::from)
    }
}

#[cfg(test)]
#[path = "auth_service_tests.rs"]
mod tests;
