//! Bearer token extraction for protected handlers.
//!
//! Keep the HTTP modules focused on request/response mapping by concentrating
//! header parsing and token verification here.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::{Ready, ready};

use crate::domain::{BearerToken, Error, VerifiedClaims};

use super::state::HttpState;

const BEARER_PREFIX: &str = "Bearer ";

/// Claims of the caller, verified from the `Authorization: Bearer` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(pub VerifiedClaims);

impl AuthenticatedUser {
    /// Verified claims.
    pub fn claims(&self) -> &VerifiedClaims {
        &self.0
    }
}

fn bearer_token(req: &HttpRequest) -> Result<BearerToken, Error> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("missing bearer token"))?;
    let value = header
        .to_str()
        .map_err(|_| Error::unauthorized("invalid or expired token"))?;
    let token = value
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::unauthorized("missing bearer token"))?;
    Ok(BearerToken::new(token))
}

fn authenticate(req: &HttpRequest) -> Result<AuthenticatedUser, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("HTTP state is not configured"))?;
    let token = bearer_token(req)?;
    state.login.authenticate(&token).map(AuthenticatedUser)
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use actix_web::test::TestRequest;
    use mockall::predicate::function;
    use rstest::rstest;

    use super::*;
    use crate::domain::ports::{MockLoginService, MockUserProfileQuery, MockUserRegistration};
    use crate::domain::{ErrorCode, UserId};
    use crate::inbound::http::state::HttpStatePorts;

    fn claims() -> VerifiedClaims {
        VerifiedClaims {
            subject: UserId::new(1).expect("positive id"),
            role: "user".to_owned(),
        }
    }

    fn state_with(login: MockLoginService) -> web::Data<HttpState> {
        web::Data::new(HttpState::new(HttpStatePorts {
            registration: Arc::new(MockUserRegistration::new()),
            login: Arc::new(login),
            profile: Arc::new(MockUserProfileQuery::new()),
        }))
    }

    #[rstest]
    fn accepts_valid_bearer_token() {
        let mut login = MockLoginService::new();
        login
            .expect_authenticate()
            .with(function(|token: &BearerToken| token.as_str() == "good"))
            .times(1)
            .return_once(|_| Ok(claims()));

        let req = TestRequest::default()
            .app_data(state_with(login))
            .insert_header((AUTHORIZATION, "Bearer good"))
            .to_http_request();

        let user = authenticate(&req).expect("authenticated");
        assert_eq!(user.claims(), &claims());
    }

    #[rstest]
    #[case(None)]
    #[case(Some("Basic dXNlcjpwYXNz"))]
    #[case(Some("Bearer "))]
    fn rejects_missing_or_malformed_header(#[case] header: Option<&str>) {
        let mut login = MockLoginService::new();
        login.expect_authenticate().never();

        let mut req = TestRequest::default().app_data(state_with(login));
        if let Some(value) = header {
            req = req.insert_header((AUTHORIZATION, value));
        }

        let err = authenticate(&req.to_http_request()).expect_err("rejected");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    fn propagates_verification_failure() {
        let mut login = MockLoginService::new();
        login
            .expect_authenticate()
            .return_once(|_| Err(Error::unauthorized("invalid or expired token")));

        let req = TestRequest::default()
            .app_data(state_with(login))
            .insert_header((AUTHORIZATION, "Bearer stale"))
            .to_http_request();

        let err = authenticate(&req).expect_err("rejected");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
        assert_eq!(err.message(), "invalid or expired token");
    }
}
