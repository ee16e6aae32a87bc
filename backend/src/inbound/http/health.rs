//! Health endpoints: liveness and readiness probes for orchestration.
//!
//! Readiness also reports which profile cache mode and notifier state were
//! selected at startup, so a degraded deployment is visible without reading
//! logs.

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, get, http::header, web};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::CacheMode;

/// Dependency modes chosen once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DependencyReport {
    /// `shared` or `degraded`.
    #[schema(value_type = String, example = "shared")]
    pub cache_mode: &'static str,
    /// Whether registration events are published.
    pub notifier_enabled: bool,
}

impl DependencyReport {
    /// Describe the selected cache mode and notifier state.
    pub fn new(cache_mode: CacheMode, notifier_enabled: bool) -> Self {
        Self {
            cache_mode: cache_mode.as_str(),
            notifier_enabled,
        }
    }
}

/// Shared health state for readiness and liveness checks.
pub struct HealthState {
    ready: AtomicBool,
    live: AtomicBool,
    dependencies: OnceLock<DependencyReport>,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            ready: AtomicBool::new(false),
            live: AtomicBool::new(true),
            dependencies: OnceLock::new(),
        }
    }
}

impl HealthState {
    /// Create a new health state starting as not ready but live.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the startup dependency selection. Later calls are ignored.
    pub fn record_dependencies(&self, report: DependencyReport) {
        let _ = self.dependencies.set(report);
    }

    /// Mark the service as ready.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Flag the service as unhealthy so liveness checks fail during shutdown.
    pub fn mark_unhealthy(&self) {
        self.live.store(false, Ordering::Release);
    }

    /// Return readiness state.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Return liveness state.
    pub fn is_alive(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }

    /// Startup dependency selection, once recorded.
    pub fn dependencies(&self) -> Option<DependencyReport> {
        self.dependencies.get().copied()
    }

    fn probe_response(probe_ok: bool) -> actix_web::HttpResponseBuilder {
        let mut response = if probe_ok {
            HttpResponse::Ok()
        } else {
            HttpResponse::ServiceUnavailable()
        };
        response.insert_header((header::CACHE_CONTROL, "no-store"));
        response
    }
}

/// Readiness probe. Returns 200 with the dependency report once startup has
/// finished; 503 otherwise.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Server is ready to handle traffic", body = DependencyReport),
        (status = 503, description = "Server is not ready")
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    let mut response = HealthState::probe_response(state.is_ready());
    match state.dependencies() {
        Some(report) if state.is_ready() => response.json(report),
        _ => response.finish(),
    }
}

/// Liveness probe. Returns 200 while the process is alive and 503 once
/// draining.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Server is alive"),
        (status = 503, description = "Server is shutting down")
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    HealthState::probe_response(state.is_alive()).finish()
}
