//! Permission resolution: credential in, module grant out.
//!
//! The cheapest source wins. A grant embedded in the credential is returned
//! directly; otherwise the permission oracle is asked once and the answer is
//! memoized for the lifetime of the resolver. The resolver is owned by one
//! session, so the memo is never shared across accounts.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, warn};

use tollgate_core::{OracleError, PermissionOracle, SubjectId};

use crate::{AccessGrant, AccessQuery, Credential};

#[derive(Debug, Clone)]
struct CachedGrant {
    subject: SubjectId,
    grant: AccessGrant,
}

/// Session-scoped permission resolver.
pub struct PermissionResolver {
    oracle: Arc<dyn PermissionOracle>,
    cache: Mutex<Option<CachedGrant>>,
}

impl PermissionResolver {
    pub fn new(oracle: Arc<dyn PermissionOracle>) -> Self {
        Self {
            oracle,
            cache: Mutex::new(None),
        }
    }

    /// Resolve the grant for `credential`. Never fails: every error path
    /// yields an empty grant.
    pub async fn resolve(&self, credential: &Credential) -> AccessGrant {
        if let Some(modules) = credential.embedded_access() {
            debug!(subject = %credential.subject(), modules = modules.len(), "using embedded access grant");
            return AccessGrant::embedded(modules);
        }

        // Held across the fetch so concurrent callers share one oracle call.
        let mut cache = self.cache.lock().await;
        if let Some(cached) = cache.as_ref() {
            if &cached.subject == credential.subject() {
                return cached.grant.clone();
            }
            debug!(subject = %credential.subject(), "credential subject changed; dropping cached grant");
            *cache = None;
        }

        match self.oracle.module_access(credential.token()).await {
            Ok(access) => {
                let grant = AccessGrant::from_oracle(access);
                debug!(subject = %credential.subject(), modules = grant.modules().count(), "fetched access grant");
                *cache = Some(CachedGrant {
                    subject: credential.subject().clone(),
                    grant: grant.clone(),
                });
                grant
            }
            Err(OracleError::NotFound) => {
                // An absent endpoint is a definitive "nothing granted".
                debug!(subject = %credential.subject(), "permission endpoint not found; empty grant");
                *cache = Some(CachedGrant {
                    subject: credential.subject().clone(),
                    grant: AccessGrant::empty(),
                });
                AccessGrant::empty()
            }
            Err(error) => {
                warn!(subject = %credential.subject(), %error, "permission lookup failed; denying all modules");
                AccessGrant::empty()
            }
        }
    }

    /// Drop the memoized grant and resolve again, e.g. after an admin changed
    /// the account's permissions mid-session.
    pub async fn refetch(&self, credential: &Credential) -> AccessGrant {
        self.invalidate().await;
        self.resolve(credential).await
    }

    pub async fn invalidate(&self) {
        *self.cache.lock().await = None;
    }

    pub async fn has_access(&self, credential: &Credential, query: impl Into<AccessQuery>) -> bool {
        crate::has_access(&self.resolve(credential).await, query)
    }
}
