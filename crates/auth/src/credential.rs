//! Bearer credentials and the validators that decode them.

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, errors::ErrorKind};

use tollgate_core::{ModuleId, SubjectId};

use crate::claims::{CredentialClaims, CredentialError, validate_claims};

/// A bearer token together with its decoded claims.
///
/// Created by an external login flow; read-only here.
#[derive(Clone, PartialEq)]
pub struct Credential {
    token: String,
    claims: CredentialClaims,
}

impl Credential {
    pub fn new(token: impl Into<String>, claims: CredentialClaims) -> Self {
        Self {
            token: token.into(),
            claims,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn claims(&self) -> &CredentialClaims {
        &self.claims
    }

    pub fn subject(&self) -> &SubjectId {
        &self.claims.sub
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.claims.expires_at()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        matches!(
            validate_claims(&self.claims, now),
            Err(CredentialError::Expired | CredentialError::NotYetValid)
        )
    }

    pub fn embedded_access(&self) -> Option<Vec<ModuleId>> {
        self.claims.embedded_access()
    }
}

// The raw token never reaches logs.
impl core::fmt::Debug for Credential {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"<redacted>")
            .field("claims", &self.claims)
            .finish()
    }
}

/// Turns a raw bearer string into a [`Credential`] valid at `now`.
pub trait CredentialValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<Credential, CredentialError>;
}

/// Verifies HS256-signed credentials with a shared secret (serving tier).
#[derive(Clone)]
pub struct Hs256CredentialValidator {
    key: DecodingKey,
}

impl Hs256CredentialValidator {
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            key: DecodingKey::from_secret(secret.as_ref()),
        }
    }
}

impl CredentialValidator for Hs256CredentialValidator {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<Credential, CredentialError> {
        decode(token, &self.key, jwt_validation(true), now)
    }
}

/// Reads claims without checking the signature (client tier).
///
/// The client holds no secret; every oracle call it makes is authenticated
/// by the backend, so the claims are only used for expiry and the embedded
/// grant.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnverifiedClaimsReader;

impl CredentialValidator for UnverifiedClaimsReader {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<Credential, CredentialError> {
        decode(token, &DecodingKey::from_secret(&[]), jwt_validation(false), now)
    }
}

fn jwt_validation(verify_signature: bool) -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    // Expiry is checked by `validate_claims` against an injected clock.
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();
    if !verify_signature {
        validation.insecure_disable_signature_validation();
    }
    validation
}

fn decode(
    token: &str,
    key: &DecodingKey,
    validation: Validation,
    now: DateTime<Utc>,
) -> Result<Credential, CredentialError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(CredentialError::Missing);
    }

    let data = jsonwebtoken::decode::<CredentialClaims>(token, key, &validation).map_err(|e| {
        match e.kind() {
            ErrorKind::ExpiredSignature => CredentialError::Expired,
            _ => CredentialError::Invalid(e.to_string()),
        }
    })?;

    validate_claims(&data.claims, now)?;
    Ok(Credential::new(token, data.claims))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use jsonwebtoken::{EncodingKey, Header};
    use serde_json::json;

    fn mint(secret: &str, exp: DateTime<Utc>, access: Option<serde_json::Value>) -> String {
        let mut claims = json!({ "sub": "acct-1", "exp": exp.timestamp(), "iat": (exp - Duration::hours(1)).timestamp() });
        if let Some(access) = access {
            claims["access"] = access;
        }
        jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn hs256_accepts_valid_and_rejects_foreign_signatures() {
        let now = Utc::now();
        let token = mint("s3cret", now + Duration::minutes(10), Some(json!([1, 3])));

        let credential = Hs256CredentialValidator::new("s3cret").validate(&token, now).unwrap();
        assert_eq!(credential.subject().as_str(), "acct-1");
        assert_eq!(
            credential.embedded_access(),
            Some(vec![ModuleId::new(1), ModuleId::new(3)])
        );

        let err = Hs256CredentialValidator::new("other").validate(&token, now).unwrap_err();
        assert!(matches!(err, CredentialError::Invalid(_)));
    }

    #[test]
    fn expiry_is_checked_against_the_supplied_clock() {
        let now = Utc::now();
        let token = mint("s3cret", now + Duration::minutes(10), None);
        let validator = Hs256CredentialValidator::new("s3cret");

        assert!(validator.validate(&token, now).is_ok());
        assert_eq!(
            validator.validate(&token, now + Duration::minutes(11)).unwrap_err(),
            CredentialError::Expired
        );
    }

    #[test]
    fn unverified_reader_ignores_signature_but_not_expiry() {
        let now = Utc::now();
        let token = mint("whatever", now + Duration::minutes(5), None);
        assert!(UnverifiedClaimsReader.validate(&token, now).is_ok());
        assert_eq!(
            UnverifiedClaimsReader
                .validate(&token, now + Duration::minutes(6))
                .unwrap_err(),
            CredentialError::Expired
        );
    }

    #[test]
    fn empty_and_garbage_tokens_are_rejected() {
        let now = Utc::now();
        assert_eq!(UnverifiedClaimsReader.validate("  ", now).unwrap_err(), CredentialError::Missing);
        assert!(matches!(
            UnverifiedClaimsReader.validate("not-a-jwt", now).unwrap_err(),
            CredentialError::Invalid(_)
        ));
    }

    #[test]
    fn debug_output_redacts_the_token() {
        let now = Utc::now();
        let token = mint("s3cret", now + Duration::minutes(10), None);
        let credential = UnverifiedClaimsReader.validate(&token, now).unwrap();
        let rendered = format!("{credential:?}");
        assert!(!rendered.contains(&token));
        assert!(rendered.contains("<redacted>"));
        assert!(!credential.is_expired(now));
        assert!(credential.is_expired(now + Duration::minutes(11)));
    }
}
