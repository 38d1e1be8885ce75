//! Credential transport: bearer header and the HTTP-only credential cookie.

use std::time::Duration;

use axum::http::{HeaderMap, header};

/// Name of the cookie holding the bearer token.
pub const CREDENTIAL_COOKIE: &str = "auth_token";

/// `Set-Cookie` value storing `token` for `max_age`.
pub fn issue_credential_cookie(token: &str, max_age: Duration, secure: bool) -> String {
    let mut cookie = format!(
        "{CREDENTIAL_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        max_age.as_secs()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value deleting the credential cookie (logout).
pub fn clear_credential_cookie(secure: bool) -> String {
    issue_credential_cookie("", Duration::ZERO, secure)
}

/// Token from `Authorization: Bearer <token>`, if present and non-empty.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

/// Token from the credential cookie, if present and non-empty.
pub fn credential_from_cookies(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == CREDENTIAL_COOKIE)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

/// Bearer header first, then the cookie.
pub fn extract_credential(headers: &HeaderMap) -> Option<&str> {
    bearer_token(headers).or_else(|| credential_from_cookies(headers))
}
