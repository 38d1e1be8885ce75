//! External sources of truth consulted by the gates.
//!
//! Oracles are read-only from the gate's point of view: the gate queries them
//! with the caller's bearer token and never mutates what they return.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ModuleId, StatusReport};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OracleError {
    #[error("oracle unreachable: {0}")]
    Unreachable(String),

    #[error("oracle responded with http status {0}")]
    Status(u16),

    /// The endpoint does not exist (404). The permission path degrades this
    /// to an empty grant instead of surfacing it.
    #[error("oracle endpoint not found")]
    NotFound,

    #[error("malformed oracle response: {0}")]
    Malformed(String),
}

impl OracleError {
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }
}

/// Module access as reported by the permission oracle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleAccess {
    pub access: Vec<ModuleId>,
    /// Display names parallel to `access`, when the backend provides them.
    #[serde(default)]
    pub access_names: Vec<String>,
}

/// Reports the account's current lifecycle status.
#[async_trait::async_trait]
pub trait StatusOracle: Send + Sync {
    async fn account_status(&self, token: &str) -> Result<StatusReport, OracleError>;
}

/// Reports whether the account currently holds an active paid subscription.
///
/// The answer changes asynchronously (payment webhooks), so callers fetch it
/// fresh on every check and never cache it.
#[async_trait::async_trait]
pub trait SubscriptionOracle: Send + Sync {
    async fn has_subscription(&self, token: &str) -> Result<bool, OracleError>;
}

/// Reports the feature modules an account may use.
#[async_trait::async_trait]
pub trait PermissionOracle: Send + Sync {
    async fn module_access(&self, token: &str) -> Result<ModuleAccess, OracleError>;
}
