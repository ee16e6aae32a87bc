//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers the account endpoints, health probes, the request and
//! response schemas, and the bearer token security scheme. The document backs
//! Swagger UI in debug builds.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode, UserIdentity};
use crate::inbound::http::health::DependencyReport;
use crate::inbound::http::users::{LoginRequest, LoginResponse, RegisterRequest};

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "bearerAuth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("HS256 token issued by POST /api/v1/login."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Auth service API",
        description = "Account registration, token login, cached profile reads and health probes."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::get_profile,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        UserIdentity,
        Error,
        ErrorCode,
        RegisterRequest,
        LoginRequest,
        LoginResponse,
        DependencyReport
    )),
    tags(
        (name = "users", description = "Registration, login and profiles"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
