//! `tollgate-auth`: credentials and module permissions.
//!
//! This crate is intentionally decoupled from HTTP: oracles are reached only
//! through the traits in `tollgate-core`.

pub mod claims;
pub mod credential;
pub mod grant;
pub mod resolver;

pub use claims::{CredentialClaims, CredentialError, validate_claims};
pub use credential::{Credential, CredentialValidator, Hs256CredentialValidator, UnverifiedClaimsReader};
pub use grant::{AccessGrant, AccessQuery, GrantSource, has_access};
pub use resolver::PermissionResolver;
