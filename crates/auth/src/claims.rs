use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

use tollgate_core::{GateError, ModuleId, SubjectId};

/// Credential claims model (transport-agnostic).
///
/// The minimal set of claims the gate reads once a bearer token has been
/// decoded. Times are JWT-style seconds since the Unix epoch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialClaims {
    /// Subject / account identifier.
    #[serde(deserialize_with = "subject_from_string_or_number")]
    pub sub: SubjectId,

    /// Expiration timestamp.
    pub exp: i64,

    /// Issued-at timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Embedded module grant, kept raw until validated by [`Self::embedded_access`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access: Option<Vec<Value>>,
}

impl CredentialClaims {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.iat.and_then(|iat| DateTime::from_timestamp(iat, 0))
    }

    /// The embedded grant, only if it is present and every element parses as
    /// a finite, non-negative integer module ID. One bad element discards the
    /// whole claim so the caller falls back to the permission oracle.
    pub fn embedded_access(&self) -> Option<Vec<ModuleId>> {
        self.access
            .as_ref()?
            .iter()
            .map(module_id_from_claim)
            .collect()
    }
}

fn module_id_from_claim(value: &Value) -> Option<ModuleId> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !number.is_finite() || number.fract() != 0.0 || number < 0.0 || number > f64::from(u32::MAX) {
        return None;
    }
    Some(ModuleId::new(number as u32))
}

fn subject_from_string_or_number<'de, D>(deserializer: D) -> Result<SubjectId, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(SubjectId::new(s)),
        Value::Number(n) => Ok(SubjectId::new(n.to_string())),
        other => Err(serde::de::Error::custom(format!(
            "subject must be a string or number, got {other}"
        ))),
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("no credential presented")]
    Missing,

    #[error("credential has expired")]
    Expired,

    #[error("credential not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid credential time window (exp <= iat)")]
    InvalidTimeWindow,

    #[error("credential could not be decoded: {0}")]
    Invalid(String),
}

impl From<CredentialError> for GateError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::Expired | CredentialError::NotYetValid => GateError::CredentialExpired,
            CredentialError::Missing
            | CredentialError::InvalidTimeWindow
            | CredentialError::Invalid(_) => GateError::CredentialMissing,
        }
    }
}

/// Deterministically validate credential claims against `now`.
///
/// Note: this validates the *claims* only. Signature verification is done by
/// the [`crate::CredentialValidator`] in use.
pub fn validate_claims(claims: &CredentialClaims, now: DateTime<Utc>) -> Result<(), CredentialError> {
    let expires_at = claims.expires_at().ok_or(CredentialError::InvalidTimeWindow)?;
    if let Some(issued_at) = claims.issued_at() {
        if expires_at <= issued_at {
            return Err(CredentialError::InvalidTimeWindow);
        }
        if now < issued_at {
            return Err(CredentialError::NotYetValid);
        }
    }
    if now >= expires_at {
        return Err(CredentialError::Expired);
    }
    Ok(())
}
