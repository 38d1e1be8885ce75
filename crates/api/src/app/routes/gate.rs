use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Query},
    http::HeaderMap,
    response::IntoResponse,
};
use chrono::Utc;

use crate::app::{AppState, dto::DecisionQuery};
use crate::cookie::extract_credential;

/// GET /api/gate/decision?path=... - what the edge would decide for `path`
/// with the caller's credential.
pub async fn decision(
    Extension(state): Extension<Arc<AppState>>,
    Query(query): Query<DecisionQuery>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let decision = state
        .gate
        .decide(&query.path, extract_credential(&headers), Utc::now())
        .await;
    Json(decision)
}
