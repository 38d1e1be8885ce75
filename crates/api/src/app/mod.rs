//! HTTP application wiring (Axum router + edge gate).
//!
//! - `routes/`: the gate's own handlers (health, session cookie, decision probe)
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;

use tollgate_auth::{CredentialValidator, Hs256CredentialValidator};
use tollgate_core::StatusOracle;

use crate::config::GateConfig;
use crate::edge::EdgeGate;
use crate::middleware::{self, EdgeState};

pub mod dto;
pub mod errors;
pub mod routes;

/// Shared handler state.
pub struct AppState {
    pub gate: Arc<EdgeGate>,
    pub validator: Arc<dyn CredentialValidator>,
    pub secure_cookies: bool,
}

/// Build the full HTTP router (public entrypoint used by `main.rs`).
///
/// Every request, including the page fallback, passes through the edge gate
/// first.
pub fn build_app(config: &GateConfig, status: Arc<dyn StatusOracle>) -> Router {
    let validator: Arc<dyn CredentialValidator> =
        Arc::new(Hs256CredentialValidator::new(config.jwt_secret.as_bytes()));
    let gate = Arc::new(EdgeGate::new(
        config.routes.clone(),
        status,
        validator.clone(),
        config.unknown_status,
    ));

    let state = Arc::new(AppState {
        gate: gate.clone(),
        validator,
        secure_cookies: config.secure_cookies,
    });

    routes::router()
        .fallback(routes::system::page)
        .layer(
            ServiceBuilder::new()
                .layer(Extension(state))
                .layer(axum::middleware::from_fn_with_state(
                    EdgeState { gate },
                    middleware::edge_middleware,
                )),
        )
}
