//! One signed-in client session: the credential plus everything memoized
//! for its lifetime.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use tollgate_auth::{
    AccessGrant, AccessQuery, Credential, CredentialError, CredentialValidator, PermissionResolver,
    UnverifiedClaimsReader,
};
use tollgate_core::PermissionOracle;

use crate::guard::{PageAccess, guard_page};
use crate::navigation::{NavGroup, filter_navigation};

/// Owns the permission cache; dropping the session drops the cache, so
/// grants never outlive the session or leak to another account.
pub struct ClientSession {
    credential: Credential,
    permissions: PermissionResolver,
}

impl ClientSession {
    pub fn new(credential: Credential, permissions: Arc<dyn PermissionOracle>) -> Self {
        Self {
            credential,
            permissions: PermissionResolver::new(permissions),
        }
    }

    /// Open a session from the stored bearer token.
    ///
    /// The client cannot verify the signature (the edge already did); it only
    /// decodes the claims and checks the time window.
    pub fn from_token(
        token: &str,
        now: DateTime<Utc>,
        permissions: Arc<dyn PermissionOracle>,
    ) -> Result<Self, CredentialError> {
        let credential = UnverifiedClaimsReader.validate(token, now)?;
        tracing::debug!(subject = %credential.subject(), "client session opened");
        Ok(Self::new(credential, permissions))
    }

    pub fn credential(&self) -> &Credential {
        &self.credential
    }

    pub async fn access(&self) -> AccessGrant {
        self.permissions.resolve(&self.credential).await
    }

    pub async fn refetch(&self) -> AccessGrant {
        self.permissions.refetch(&self.credential).await
    }

    pub async fn has_access(&self, query: impl Into<AccessQuery>) -> bool {
        self.permissions.has_access(&self.credential, query).await
    }

    pub async fn navigation(&self, groups: &[NavGroup]) -> Vec<NavGroup> {
        filter_navigation(groups, &self.access().await)
    }

    pub async fn guard(&self, required: impl Into<AccessQuery>) -> PageAccess {
        guard_page(&self.access().await, required)
    }
}
