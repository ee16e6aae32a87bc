//! Domain primitives, the auth core, and its ports.
//!
//! Purpose: Define strongly typed identities and credentials, and the
//! components that hash passwords, issue tokens, cache profiles, and publish
//! events. Adapters depend on this module; it never depends on them.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - UserId / UserIdentity / NewUser: identity model.
//! - Password / PasswordHash / Registration / LoginCredentials: credentials.
//! - CredentialHasher / TokenIssuer / ProfileCache / EventNotifier: core
//!   components.
//! - AuthService / AuthError: orchestrator and its typed failures.

pub mod auth;
pub mod auth_error;
pub mod auth_service;
pub mod credential_hasher;
pub mod deadline;
pub mod error;
pub mod events;
pub mod notifier;
pub mod ports;
pub mod profile_cache;
pub mod token_issuer;
pub mod trace_id;
pub mod user;

pub use self::auth::{
    CredentialRecord, CredentialValidationError, LoginCredentials, Password, PasswordHash,
    Registration,
};
pub use self::auth_error::AuthError;
pub use self::auth_service::{AuthService, AuthServicePorts, DEFAULT_TOKEN_TTL};
pub use self::credential_hasher::{
    Argon2CredentialHasher, CredentialHasher, CredentialHasherError, HashingCost,
};
pub use self::deadline::{CallError, Deadline, run_to_completion, within};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::events::{DomainEvent, USER_REGISTERED_TOPIC};
pub use self::notifier::{EventNotifier, PublishFailure};
pub use self::profile_cache::{
    CacheMode, DEFAULT_PROFILE_TTL, LocalProfileCache, ProfileCache, ProfileCacheError,
    ProfileCacheSettings, SharedProfileCache, select_profile_cache,
};
pub use self::token_issuer::{BearerToken, TokenError, TokenIssuer, VerifiedClaims};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{DEFAULT_ROLE, NewUser, UserId, UserIdValidationError, UserIdentity};
