//! Request field validation for inbound HTTP adapters.
//!
//! Field policy lives here rather than in the domain: the auth core only
//! refuses empty credentials. Failures are `invalid_request` errors whose
//! details name the field and a stable machine-readable code.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::json;

use crate::domain::{DEFAULT_ROLE, Error};

/// Roles accepted at registration.
pub(crate) const ALLOWED_ROLES: [&str; 2] = [DEFAULT_ROLE, "admin"];

const USERNAME_MIN: usize = 3;
const USERNAME_MAX: usize = 32;
const EMAIL_MAX: usize = 254;
const PASSWORD_MIN: usize = 8;
const PASSWORD_MAX: usize = 128;

static USERNAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_]+$").unwrap_or_else(|err| panic!("username pattern: {err}"))
});

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s.]+(\.[^@\s.]+)+$")
        .unwrap_or_else(|err| panic!("email pattern: {err}"))
});

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidLength,
    InvalidFormat,
    UnsupportedValue,
    InvalidUserId,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidLength => "invalid_length",
            ErrorCode::InvalidFormat => "invalid_format",
            ErrorCode::UnsupportedValue => "unsupported_value",
            ErrorCode::InvalidUserId => "invalid_user_id",
        }
    }
}

/// Newtype wrapper for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(self) -> &'static str {
        self.0
    }
}

pub(crate) const USERNAME: FieldName = FieldName::new("username");
pub(crate) const EMAIL: FieldName = FieldName::new("email");
pub(crate) const PASSWORD: FieldName = FieldName::new("password");
pub(crate) const ROLE: FieldName = FieldName::new("role");
pub(crate) const USER_ID: FieldName = FieldName::new("id");

fn field_error(field: FieldName, code: ErrorCode, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "code": code.as_str(),
    }))
}

fn require_length(
    field: FieldName,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), Error> {
    if value.is_empty() {
        return Err(field_error(
            field,
            ErrorCode::MissingField,
            format!("{} must not be empty", field.as_str()),
        ));
    }
    let length = value.chars().count();
    if !(min..=max).contains(&length) {
        return Err(field_error(
            field,
            ErrorCode::InvalidLength,
            format!("{} must be {min}-{max} characters", field.as_str()),
        ));
    }
    Ok(())
}

/// Usernames are 3-32 letters, digits or underscores.
pub(crate) fn validate_username(username: &str) -> Result<(), Error> {
    let username = username.trim();
    require_length(USERNAME, username, USERNAME_MIN, USERNAME_MAX)?;
    if !USERNAME_PATTERN.is_match(username) {
        return Err(field_error(
            USERNAME,
            ErrorCode::InvalidFormat,
            "username may contain only letters, digits and underscores",
        ));
    }
    Ok(())
}

/// Emails must look like `local@domain.tld` and fit in 254 characters.
pub(crate) fn validate_email(email: &str) -> Result<(), Error> {
    let email = email.trim();
    require_length(EMAIL, email, 1, EMAIL_MAX)?;
    if !EMAIL_PATTERN.is_match(email) {
        return Err(field_error(
            EMAIL,
            ErrorCode::InvalidFormat,
            "email must be a valid address",
        ));
    }
    Ok(())
}

/// Passwords are 8-128 characters; content is not otherwise restricted.
pub(crate) fn validate_password(password: &str) -> Result<(), Error> {
    require_length(PASSWORD, password, PASSWORD_MIN, PASSWORD_MAX)
}

/// A blank or absent role means the default; otherwise it must be allowed.
pub(crate) fn validate_role(role: Option<&str>) -> Result<(), Error> {
    match role.map(str::trim) {
        None | Some("") => Ok(()),
        Some(role) if ALLOWED_ROLES.contains(&role) => Ok(()),
        Some(_) => Err(field_error(
            ROLE,
            ErrorCode::UnsupportedValue,
            format!("role must be one of: {}", ALLOWED_ROLES.join(", ")),
        )),
    }
}

/// Login only requires both fields to be present.
pub(crate) fn require_present(field: FieldName, value: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(field_error(
            field,
            ErrorCode::MissingField,
            format!("{} must not be empty", field.as_str()),
        ));
    }
    Ok(())
}

pub(crate) fn invalid_user_id_error(value: &str) -> Error {
    Error::invalid_request("user id must be a positive integer").with_details(json!({
        "field": USER_ID.as_str(),
        "value": value,
        "code": ErrorCode::InvalidUserId.as_str(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::Value;

    fn detail_code(error: &Error) -> Option<&str> {
        error
            .details()
            .and_then(|details| details.get("code"))
            .and_then(Value::as_str)
    }

    #[rstest]
    #[case("alice")]
    #[case("bob_99")]
    #[case("abc")]
    #[case(&"a".repeat(32))]
    fn accepts_valid_usernames(#[case] username: &str) {
        assert!(validate_username(username).is_ok());
    }

    #[rstest]
    #[case("", "missing_field")]
    #[case("ab", "invalid_length")]
    #[case(&"a".repeat(33), "invalid_length")]
    #[case("alice smith", "invalid_format")]
    #[case("alice!", "invalid_format")]
    fn rejects_invalid_usernames(#[case] username: &str, #[case] code: &str) {
        let err = validate_username(username).expect_err("invalid username");
        assert_eq!(detail_code(&err), Some(code));
    }

    #[rstest]
    #[case("alice@example.com")]
    #[case("first.last+tag@mail.example.co.uk")]
    fn accepts_valid_emails(#[case] email: &str) {
        assert!(validate_email(email).is_ok());
    }

    #[rstest]
    #[case("", "missing_field")]
    #[case("alice", "invalid_format")]
    #[case("alice@example", "invalid_format")]
    #[case("a@b@c.com", "invalid_format")]
    #[case("alice@exa mple.com", "invalid_format")]
    fn rejects_invalid_emails(#[case] email: &str, #[case] code: &str) {
        let err = validate_email(email).expect_err("invalid email");
        assert_eq!(detail_code(&err), Some(code));
    }

    #[rstest]
    fn rejects_overlong_email() {
        let email = format!("{}@example.com", "a".repeat(250));
        let err = validate_email(&email).expect_err("too long");
        assert_eq!(detail_code(&err), Some("invalid_length"));
    }

    #[rstest]
    #[case("Secret12", true)]
    #[case(&"p".repeat(128), true)]
    #[case("short", false)]
    #[case(&"p".repeat(129), false)]
    #[case("", false)]
    fn password_length_bounds(#[case] password: &str, #[case] ok: bool) {
        assert_eq!(validate_password(password).is_ok(), ok);
    }

    #[rstest]
    #[case(None, true)]
    #[case(Some(""), true)]
    #[case(Some("user"), true)]
    #[case(Some("admin"), true)]
    #[case(Some("root"), false)]
    fn role_must_be_known(#[case] role: Option<&str>, #[case] ok: bool) {
        assert_eq!(validate_role(role).is_ok(), ok);
    }

    #[rstest]
    fn invalid_user_id_names_the_value() {
        let err = invalid_user_id_error("abc");
        assert_eq!(detail_code(&err), Some("invalid_user_id"));
        assert_eq!(
            err.details().and_then(|d| d.get("value")).and_then(Value::as_str),
            Some("abc")
        );
    }
}
