//! HTTP inbound adapter exposing the account REST endpoints.

pub mod auth;
pub mod error;
pub mod health;
pub mod state;
pub mod users;
pub mod validation;

pub use error::ApiResult;
