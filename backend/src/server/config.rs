//! HTTP server configuration object.

use std::net::SocketAddr;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

/// Listener settings and middleware handed to [`super::create_server`].
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: PrometheusMetrics,
}

impl ServerConfig {
    /// Construct a server configuration bound to `bind_addr`.
    ///
    /// With the `metrics` feature the Prometheus middleware is required, as
    /// its registry also carries the auth counters.
    #[must_use]
    pub fn new(
        bind_addr: SocketAddr,
        #[cfg(feature = "metrics")] prometheus: PrometheusMetrics,
    ) -> Self {
        Self {
            bind_addr,
            #[cfg(feature = "metrics")]
            prometheus,
        }
    }
}
