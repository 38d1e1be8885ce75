use std::sync::Arc;

use axum::{
    extract::State,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use tracing::Instrument;
use uuid::Uuid;

use crate::context::GateContext;
use crate::cookie::extract_credential;
use crate::edge::{EdgeGate, Verdict};

#[derive(Clone)]
pub struct EdgeState {
    pub gate: Arc<EdgeGate>,
}

/// Run the edge gate in front of every request.
///
/// `Allow` passes the request on with a [`GateContext`]; `RedirectTo` ends it
/// with `307 Temporary Redirect`.
pub async fn edge_middleware(
    State(state): State<EdgeState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();
    let token = extract_credential(req.headers()).map(str::to_owned);

    let span = tracing::info_span!("edge_gate", request_id = %Uuid::now_v7(), path = %path);
    let decision = state
        .gate
        .decide(&path, token.as_deref(), Utc::now())
        .instrument(span)
        .await;

    tracing::debug!(
        path = %decision.path,
        route_class = ?decision.route_class,
        reason = ?decision.reason,
        allowed = decision.verdict.is_allow(),
        "edge decision"
    );

    match &decision.verdict {
        Verdict::Allow => {
            req.extensions_mut().insert(GateContext::from(&decision));
            next.run(req).await
        }
        Verdict::RedirectTo(location) => Redirect::temporary(location).into_response(),
    }
}
