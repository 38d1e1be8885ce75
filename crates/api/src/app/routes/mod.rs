use axum::{
    Router,
    routing::{get, post},
};

pub mod gate;
pub mod session;
pub mod system;

/// Router for the gate's own endpoints (all under public route classes).
pub fn router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/api/session", post(session::create_session))
        .route("/api/logout", post(session::logout))
        .route("/api/gate/decision", get(gate::decision))
}
