//! Edge gate HTTP service: route classification, credential transport and
//! account-status redirects in front of every request.

pub mod app;
pub mod config;
pub mod context;
pub mod cookie;
pub mod edge;
pub mod middleware;

pub use config::{ConfigError, GateConfig, UnknownStatusPolicy};
pub use edge::{DecisionReason, EdgeDecision, EdgeGate, Verdict};
