//! Backend response envelopes.
//!
//! Every oracle answers `{ "success": true, "data": { ... } }`. Any other
//! shape is malformed and handled fail-closed by the caller.

use serde::Deserialize;
use serde::de::DeserializeOwned;

use tollgate_core::{ModuleAccess, ModuleId, OracleError, StatusReport};

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
}

/// Decode a success envelope and return its `data`.
pub fn parse_envelope<T: DeserializeOwned>(body: &[u8]) -> Result<T, OracleError> {
    let envelope: Envelope<T> = serde_json::from_slice(body)
        .map_err(|e| OracleError::malformed(format!("invalid envelope: {e}")))?;
    if !envelope.success {
        return Err(OracleError::malformed("envelope reports success=false"));
    }
    envelope
        .data
        .ok_or_else(|| OracleError::malformed("envelope has no data"))
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusData {
    status: String,
}

impl StatusData {
    /// An empty status is an empty result, not an unknown status.
    pub(crate) fn into_report(self) -> Result<StatusReport, OracleError> {
        if self.status.trim().is_empty() {
            return Err(OracleError::malformed("empty account status"));
        }
        Ok(StatusReport::parse(&self.status))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct SubscriptionData {
    #[serde(rename = "hasSubscription")]
    pub(crate) has_subscription: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AccessData {
    access: Vec<ModuleId>,
    #[serde(default)]
    access_names: Option<Vec<String>>,
}

impl From<AccessData> for ModuleAccess {
    fn from(value: AccessData) -> Self {
        ModuleAccess {
            access: value.access,
            access_names: value.access_names.unwrap_or_default(),
        }
    }
}
