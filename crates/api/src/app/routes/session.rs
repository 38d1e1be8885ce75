//! Credential cookie issue/clear.
//!
//! The login flow itself is external; it hands the minted token to
//! `POST /api/session`, which validates it and stores it as the HTTP-only
//! credential cookie.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json,
    extract::Extension,
    http::{StatusCode, header},
    response::IntoResponse,
};
use chrono::Utc;

use crate::app::{AppState, dto, errors};
use crate::cookie::{clear_credential_cookie, issue_credential_cookie};

pub async fn create_session(
    Extension(state): Extension<Arc<AppState>>,
    Json(body): Json<dto::CreateSessionRequest>,
) -> axum::response::Response {
    let now = Utc::now();
    let credential = match state.validator.validate(&body.token, now) {
        Ok(credential) => credential,
        Err(e) => {
            tracing::warn!(error = %e, "refusing to store credential cookie");
            return errors::credential_error_to_response(e);
        }
    };

    let max_age = credential
        .expires_at()
        .and_then(|exp| (exp - now).to_std().ok())
        .unwrap_or(Duration::ZERO);
    let cookie = issue_credential_cookie(credential.token(), max_age, state.secure_cookies);

    tracing::info!(subject = %credential.subject(), "credential cookie issued");
    (
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(dto::SessionResponse {
            subject: credential.subject().clone(),
            expires_at: credential.expires_at(),
        }),
    )
        .into_response()
}

pub async fn logout(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, clear_credential_cookie(state.secure_cookies))],
    )
}
