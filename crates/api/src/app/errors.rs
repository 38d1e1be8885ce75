use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use tollgate_auth::CredentialError;

pub fn credential_error_to_response(err: CredentialError) -> axum::response::Response {
    match err {
        CredentialError::Missing => json_error(StatusCode::BAD_REQUEST, "credential_missing", err.to_string()),
        CredentialError::Expired | CredentialError::NotYetValid => {
            json_error(StatusCode::UNAUTHORIZED, "credential_expired", err.to_string())
        }
        CredentialError::InvalidTimeWindow | CredentialError::Invalid(_) => {
            json_error(StatusCode::UNAUTHORIZED, "credential_invalid", err.to_string())
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
