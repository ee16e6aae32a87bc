//! Account API handlers.
//!
//! ```text
//! POST /api/v1/register {"username":"alice","email":"alice@example.com","password":"Secret123"}
//! POST /api/v1/login {"email":"alice@example.com","password":"Secret123"}
//! GET /api/v1/users/{id}   (Authorization: Bearer <token>)
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{Error, LoginCredentials, Registration, UserId, UserIdentity};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    EMAIL, PASSWORD, invalid_user_id_error, require_present, validate_email, validate_password,
    validate_role, validate_username,
};

/// Registration request body for `POST /api/v1/register`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[schema(example = "alice")]
    pub username: String,
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = "Secret123")]
    pub password: String,
    /// `user` (default) or `admin`.
    #[serde(default)]
    pub role: Option<String>,
}

impl RegisterRequest {
    fn validate(&self) -> Result<Registration, Error> {
        validate_username(&self.username)?;
        validate_email(&self.email)?;
        validate_password(&self.password)?;
        validate_role(self.role.as_deref())?;
        Registration::try_from_parts(
            &self.username,
            &self.email,
            &self.password,
            self.role.as_deref().unwrap_or_default(),
        )
        .map_err(|err| Error::invalid_request(err.to_string()))
    }
}

/// Login request body for `POST /api/v1/login`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = "Secret123")]
    pub password: String,
}

impl LoginRequest {
    fn validate(&self) -> Result<LoginCredentials, Error> {
        require_present(EMAIL, &self.email)?;
        require_present(PASSWORD, &self.password)?;
        LoginCredentials::try_from_parts(&self.email, &self.password)
            .map_err(|err| Error::invalid_request(err.to_string()))
    }
}

/// Successful login payload.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// HS256 JWT to send as `Authorization: Bearer <token>`.
    pub token: String,
}

/// Create an account.
#[utoipa::path(
    post,
    path = "/api/v1/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserIdentity),
        (status = 400, description = "Invalid request", body = Error),
        (status = 409, description = "Email already registered", body = Error),
        (status = 503, description = "User store unavailable", body = Error),
        (status = 504, description = "Request deadline exceeded", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration = payload.validate()?;
    let identity = state
        .registration
        .register(&registration, state.deadline())
        .await?;
    Ok(HttpResponse::Created().json(identity))
}

/// Exchange credentials for a bearer token.
///
/// Unknown emails and wrong passwords produce the same 401 response.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = LoginResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 503, description = "User store unavailable", body = Error),
        (status = 504, description = "Request deadline exceeded", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<LoginResponse>> {
    let credentials = payload.validate()?;
    let token = state.login.login(&credentials, state.deadline()).await?;
    Ok(web::Json(LoginResponse {
        token: token.into_inner(),
    }))
}

/// Fetch a user profile.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = i64, Path, description = "User identifier")),
    responses(
        (status = 200, description = "Profile", body = UserIdentity),
        (status = 400, description = "Invalid user id", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 404, description = "Unknown user", body = Error),
        (status = 503, description = "User store unavailable", body = Error),
        (status = 504, description = "Request deadline exceeded", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["users"],
    operation_id = "getProfile",
    security(("bearerAuth" = []))
)]
#[get("/users/{id}")]
pub async fn get_profile(
    state: web::Data<HttpState>,
    _caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<UserIdentity>> {
    let raw = path.into_inner();
    let user_id = raw
        .parse::<i64>()
        .ok()
        .and_then(|value| UserId::new(value).ok())
        .ok_or_else(|| invalid_user_id_error(&raw))?;
    let identity = state
        .profile
        .fetch_profile(user_id, state.deadline())
        .await?;
    Ok(web::Json(identity))
}
