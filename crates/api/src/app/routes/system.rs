use axum::{
    Json,
    extract::Extension,
    http::{StatusCode, Uri},
    response::IntoResponse,
};

use crate::app::dto::PageResponse;
use crate::context::GateContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// Fallback for every page path the edge let through.
pub async fn page(Extension(gate): Extension<GateContext>, uri: Uri) -> impl IntoResponse {
    Json(PageResponse {
        path: uri.path().to_string(),
        route_class: gate.route_class(),
        subject: gate.subject().cloned(),
    })
}
