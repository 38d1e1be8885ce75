//! Account lifecycle status as reported by the status oracle.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle stage of an account through payment/approval before full access.
///
/// Exactly one value holds per account at any instant. Transitions happen
/// entirely in the status backend; the gate only observes them.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountStatus {
    PassiveNoPayment,
    PendingApproval,
    ActiveReady,
    Subscribed,
    Rejected,
    Suspended,
}

impl AccountStatus {
    pub const ALL: [AccountStatus; 6] = [
        AccountStatus::PassiveNoPayment,
        AccountStatus::PendingApproval,
        AccountStatus::ActiveReady,
        AccountStatus::Subscribed,
        AccountStatus::Rejected,
        AccountStatus::Suspended,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::PassiveNoPayment => "PASSIVE_NO_PAYMENT",
            AccountStatus::PendingApproval => "PENDING_APPROVAL",
            AccountStatus::ActiveReady => "ACTIVE_READY",
            AccountStatus::Subscribed => "SUBSCRIBED",
            AccountStatus::Rejected => "REJECTED",
            AccountStatus::Suspended => "SUSPENDED",
        }
    }

    /// The "not yet paid" statuses: the account still has onboarding to finish.
    pub fn needs_setup(&self) -> bool {
        matches!(
            self,
            AccountStatus::PassiveNoPayment | AccountStatus::PendingApproval | AccountStatus::Rejected
        )
    }

    /// Statuses that may proceed to the subscription check.
    pub fn is_entitled(&self) -> bool {
        matches!(self, AccountStatus::ActiveReady | AccountStatus::Subscribed)
    }
}

impl core::fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown account status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for AccountStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AccountStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// What the status oracle actually said.
///
/// The backend owns the status vocabulary and may introduce values this
/// build does not know about; those are kept verbatim instead of being
/// squeezed into the closed enum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StatusReport {
    Known(AccountStatus),
    Unrecognized(String),
}

impl StatusReport {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.parse::<AccountStatus>() {
            Ok(status) => StatusReport::Known(status),
            Err(UnknownStatus(value)) => StatusReport::Unrecognized(value),
        }
    }

    pub fn known(&self) -> Option<AccountStatus> {
        match self {
            StatusReport::Known(status) => Some(*status),
            StatusReport::Unrecognized(_) => None,
        }
    }
}

impl From<AccountStatus> for StatusReport {
    fn from(value: AccountStatus) -> Self {
        StatusReport::Known(value)
    }
}
