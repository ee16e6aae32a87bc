//! Auth service entry-point: loads settings, assembles the auth core and
//! serves the REST API.

mod server;

use std::sync::Arc;

use actix_web::web;
#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetricsBuilder;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use auth_service::domain::ports::AuthMetrics;
#[cfg(not(feature = "metrics"))]
use auth_service::domain::ports::NoOpAuthMetrics;
use auth_service::inbound::http::health::HealthState;
#[cfg(feature = "metrics")]
use auth_service::outbound::metrics::PrometheusAuthMetrics;
use auth_service::settings::AuthSettings;
use server::{AuthComponents, ServerConfig, build_auth_components, build_http_state, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AuthSettings::load()
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
    info!(settings = ?settings, "settings loaded");
    let bind_addr = settings
        .bind_addr()
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    #[cfg(feature = "metrics")]
    let prometheus = PrometheusMetricsBuilder::new("auth")
        .endpoint("/metrics")
        .build()
        .map_err(|e| std::io::Error::other(format!("configure Prometheus metrics: {e}")))?;
    #[cfg(feature = "metrics")]
    let metrics: Arc<dyn AuthMetrics> = Arc::new(
        PrometheusAuthMetrics::new(&prometheus.registry)
            .map_err(|e| std::io::Error::other(format!("auth metrics registration failed: {e}")))?,
    );
    #[cfg(not(feature = "metrics"))]
    let metrics: Arc<dyn AuthMetrics> = Arc::new(NoOpAuthMetrics);

    let AuthComponents { service, report } = build_auth_components(&settings, metrics).await?;
    let http_state = web::Data::new(build_http_state(&service, &settings)?);

    let health_state = web::Data::new(HealthState::new());
    health_state.record_dependencies(report);

    #[cfg(feature = "metrics")]
    let config = ServerConfig::new(bind_addr, prometheus);
    #[cfg(not(feature = "metrics"))]
    let config = ServerConfig::new(bind_addr);

    let server = create_server(health_state, http_state, config)?;
    info!(%bind_addr, "auth service listening");
    server.await
}
