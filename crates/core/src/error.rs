//! Gate error model.

use thiserror::Error;

use crate::oracle::OracleError;

/// Result type used across the gate tiers.
pub type GateResult<T> = Result<T, GateError>;

/// Why a gate refused to let a caller through.
///
/// Every variant is fail-closed: none of them may ever turn into an allow
/// verdict, a proceed outcome, or a grant with access. The only open path is
/// a positive confirmation from an oracle.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GateError {
    /// No credential accompanied the request, or it could not be decoded.
    #[error("credential missing")]
    CredentialMissing,

    /// The credential decoded but is outside its validity window.
    #[error("credential expired")]
    CredentialExpired,

    /// An oracle could not be reached (network failure, timeout, non-2xx).
    #[error("oracle unreachable: {0}")]
    OracleUnreachable(String),

    /// An oracle answered, but not with the expected envelope.
    #[error("oracle returned a malformed response: {0}")]
    OracleMalformedResponse(String),

    /// Status, subscription or permission denies access.
    #[error("not entitled: {0}")]
    NotEntitled(String),
}

impl GateError {
    pub fn unreachable(msg: impl Into<String>) -> Self {
        Self::OracleUnreachable(msg.into())
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::OracleMalformedResponse(msg.into())
    }

    pub fn not_entitled(msg: impl Into<String>) -> Self {
        Self::NotEntitled(msg.into())
    }

    /// Oracle failures cannot be told apart from a genuine denial by the
    /// caller, so they are surfaced as "try again" rather than as an error.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            GateError::OracleUnreachable(_) | GateError::OracleMalformedResponse(_)
        )
    }
}

impl From<OracleError> for GateError {
    fn from(err: OracleError) -> Self {
        match err {
            OracleError::Unreachable(msg) => GateError::OracleUnreachable(msg),
            OracleError::Status(code @ (401 | 403)) => {
                GateError::NotEntitled(format!("oracle refused credential ({code})"))
            }
            OracleError::Status(code) => GateError::OracleUnreachable(format!("http status {code}")),
            OracleError::NotFound => GateError::OracleUnreachable("endpoint not found".to_string()),
            OracleError::Malformed(msg) => GateError::OracleMalformedResponse(msg),
        }
    }
}
