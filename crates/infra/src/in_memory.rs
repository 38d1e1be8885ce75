use std::collections::HashMap;
use std::sync::RwLock;

use tollgate_core::{
    AccountStatus, ModuleAccess, ModuleId, OracleError, PermissionOracle, StatusOracle, StatusReport,
    SubscriptionOracle,
};

/// What the backend knows about one account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRecord {
    pub status: StatusReport,
    pub has_subscription: bool,
    pub access: Vec<ModuleId>,
}

impl AccountRecord {
    pub fn new(status: AccountStatus) -> Self {
        Self {
            status: StatusReport::Known(status),
            has_subscription: false,
            access: Vec::new(),
        }
    }

    pub fn subscribed(mut self) -> Self {
        self.has_subscription = true;
        self
    }

    pub fn with_access(mut self, access: impl IntoIterator<Item = ModuleId>) -> Self {
        self.access = access.into_iter().collect();
        self
    }
}

/// In-memory oracle backend keyed by bearer token.
///
/// Intended for tests/dev. Unknown tokens answer like a backend that rejects
/// the credential (401).
#[derive(Debug, Default)]
pub struct StaticOracle {
    accounts: RwLock<HashMap<String, AccountRecord>>,
}

impl StaticOracle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, token: impl Into<String>, record: AccountRecord) {
        self.accounts
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(token.into(), record);
    }

    /// Mutate an account in place, as a payment webhook or an admin would.
    pub fn update(&self, token: &str, f: impl FnOnce(&mut AccountRecord)) -> bool {
        let mut accounts = self
            .accounts
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match accounts.get_mut(token) {
            Some(record) => {
                f(record);
                true
            }
            None => false,
        }
    }

    fn lookup(&self, token: &str) -> Result<AccountRecord, OracleError> {
        self.accounts
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(token)
            .cloned()
            .ok_or(OracleError::Status(401))
    }
}

#[async_trait::async_trait]
impl StatusOracle for StaticOracle {
    async fn account_status(&self, token: &str) -> Result<StatusReport, OracleError> {
        Ok(self.lookup(token)?.status)
    }
}

#[async_trait::async_trait]
impl SubscriptionOracle for StaticOracle {
    async fn has_subscription(&self, token: &str) -> Result<bool, OracleError> {
        Ok(self.lookup(token)?.has_subscription)
    }
}

#[async_trait::async_trait]
impl PermissionOracle for StaticOracle {
    async fn module_access(&self, token: &str) -> Result<ModuleAccess, OracleError> {
        Ok(ModuleAccess {
            access: self.lookup(token)?.access,
            access_names: Vec::new(),
        })
    }
}
