//! GoTrue / PostgREST wire shapes.
//!
//! DESIGN
//! ======
//! Request bodies borrow from the caller; responses decode straight into the
//! `authstate` records. Error bodies from both services collapse into
//! [`ProviderError::Api`] so callers match on one shape.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use authstate::user::UserMetadata;
use authstate::{Profile, ProviderError, Session, User};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body for `grant_type=password`.
#[derive(Serialize)]
pub struct PasswordGrant<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Body for `grant_type=refresh_token`.
#[derive(Serialize)]
pub struct RefreshGrant<'a> {
    pub refresh_token: &'a str,
}

/// Body for `/auth/v1/signup`. `data` lands in the user's metadata.
#[derive(Serialize)]
pub struct SignUpRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
    pub data: &'a UserMetadata,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: User,
}

fn parse_failed(e: &serde_json::Error) -> ProviderError {
    ProviderError::Parse(e.to_string())
}

/// Decode a token response. `expires_at` is derived from `expires_in` when
/// the server only sends the relative lifetime.
///
/// # Errors
///
/// Returns [`ProviderError::Parse`] when the body is not a token response.
pub fn parse_session(body: &str, now_secs: i64) -> Result<Session, ProviderError> {
    let token: TokenResponse = serde_json::from_str(body).map_err(|e| parse_failed(&e))?;
    let expires_at = token.expires_at.or_else(|| token.expires_in.map(|secs| now_secs + secs));
    Ok(Session { access_token: token.access_token, refresh_token: token.refresh_token, expires_at, user: token.user })
}

/// Decode a sign-up response.
///
/// GoTrue answers with the bare user while confirmation is pending and with
/// a session-shaped `{ user, access_token, .. }` object otherwise; only the
/// user is kept either way.
///
/// # Errors
///
/// Returns [`ProviderError::Parse`] when no user can be decoded.
pub fn parse_signup(body: &str) -> Result<User, ProviderError> {
    let value: Value = serde_json::from_str(body).map_err(|e| parse_failed(&e))?;
    let user = match value.get("user") {
        Some(user) if user.is_object() => user.clone(),
        _ => value,
    };
    serde_json::from_value(user).map_err(|e| parse_failed(&e))
}

/// Decode a single-row profile response.
///
/// # Errors
///
/// Returns [`ProviderError::Parse`] when the body is not a profile object.
pub fn parse_profile(body: &str) -> Result<Profile, ProviderError> {
    serde_json::from_str(body).map_err(|e| parse_failed(&e))
}

/// Map a non-2xx response into [`ProviderError::Api`].
///
/// GoTrue uses `msg` / `error_description` / `error_code`; PostgREST uses
/// `message` / `code`. Bodies that are not JSON fall back to a status line.
#[must_use]
pub fn parse_error(status: u16, body: &str) -> ProviderError {
    let value: Value = serde_json::from_str(body).unwrap_or(Value::Null);
    let text = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_owned);

    let message = text("msg")
        .or_else(|| text("error_description"))
        .or_else(|| text("message"))
        .or_else(|| text("error"))
        .unwrap_or_else(|| format!("request failed: {status}"));
    let code = text("error_code").or_else(|| text("code"));

    ProviderError::Api { status, code, message }
}
