//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::Deadline;
use crate::domain::ports::{LoginService, UserProfileQuery, UserRegistration};

/// Default per-request deadline.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub registration: Arc<dyn UserRegistration>,
    pub login: Arc<dyn LoginService>,
    pub profile: Arc<dyn UserProfileQuery>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub registration: Arc<dyn UserRegistration>,
    pub login: Arc<dyn LoginService>,
    pub profile: Arc<dyn UserProfileQuery>,
    request_timeout: Duration,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle with the default request timeout.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use auth_service::domain::AuthService;
    /// use auth_service::inbound::http::state::{HttpState, HttpStatePorts};
    ///
    /// fn state_for(service: Arc<AuthService>) -> HttpState {
    ///     HttpState::new(HttpStatePorts {
    ///         registration: service.clone(),
    ///         login: service.clone(),
    ///         profile: service,
    ///     })
    /// }
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            registration,
            login,
            profile,
        } = ports;
        Self {
            registration,
            login,
            profile,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Override how long each request may spend in the auth core.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Configured per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Deadline for a request starting now.
    pub fn deadline(&self) -> Deadline {
        Deadline::after(self.request_timeout)
    }
}
