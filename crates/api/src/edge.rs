//! Edge gate: the first, coarse-grained, per-request authorization check.
//!
//! Runs before any protected content is produced. Stateless across requests:
//! every decision is a function of the request and the oracle's answer.
//! One shot per request, no retries.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, warn};

use tollgate_auth::{CredentialError, CredentialValidator};
use tollgate_core::{AccountStatus, GateError, RouteClass, RouteRules, StatusOracle, StatusReport, SubjectId};

use crate::config::UnknownStatusPolicy;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", content = "location", rename_all = "snake_case")]
pub enum Verdict {
    Allow,
    RedirectTo(String),
}

impl Verdict {
    pub fn is_allow(&self) -> bool {
        matches!(self, Verdict::Allow)
    }
}

/// Why the edge reached its verdict.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    PublicRoute,
    OnboardingRoute,
    SuspendedNoticeRoute,
    MissingCredential,
    ExpiredCredential,
    OracleFailure,
    /// The status oracle refused the credential (401/403).
    NotEntitled,
    Suspended,
    PaymentGated,
    SetupPendingUngated,
    Entitled,
    UnrecognizedStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeDecision {
    pub path: String,
    pub route_class: RouteClass,
    #[serde(flatten)]
    pub verdict: Verdict,
    pub reason: DecisionReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<SubjectId>,
}

pub struct EdgeGate {
    rules: RouteRules,
    status: Arc<dyn StatusOracle>,
    validator: Arc<dyn CredentialValidator>,
    unknown_status: UnknownStatusPolicy,
}

impl EdgeGate {
    pub fn new(
        rules: RouteRules,
        status: Arc<dyn StatusOracle>,
        validator: Arc<dyn CredentialValidator>,
        unknown_status: UnknownStatusPolicy,
    ) -> Self {
        Self {
            rules,
            status,
            validator,
            unknown_status,
        }
    }

    pub fn rules(&self) -> &RouteRules {
        &self.rules
    }

    /// Decide whether a request for `path` carrying `token` may proceed.
    pub async fn decide(&self, path: &str, token: Option<&str>, now: DateTime<Utc>) -> EdgeDecision {
        let route_class = self.rules.classify(path);
        let decision = |verdict: Verdict, reason: DecisionReason, subject: Option<SubjectId>| EdgeDecision {
            path: path.to_string(),
            route_class,
            verdict,
            reason,
            subject,
        };

        // Non-gated classes pass without looking at the credential, so the
        // target of a redirect can never itself redirect.
        match route_class {
            RouteClass::Public => return decision(Verdict::Allow, DecisionReason::PublicRoute, None),
            RouteClass::OnboardingFlow => {
                return decision(Verdict::Allow, DecisionReason::OnboardingRoute, None);
            }
            RouteClass::SuspendedNotice => {
                return decision(Verdict::Allow, DecisionReason::SuspendedNoticeRoute, None);
            }
            RouteClass::Protected => {}
        }

        let fallback = || Verdict::RedirectTo(self.rules.fallback_path.clone());

        let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) else {
            debug!(path, "no credential on protected route");
            return decision(fallback(), DecisionReason::MissingCredential, None);
        };

        let credential = match self.validator.validate(token, now) {
            Ok(credential) => credential,
            Err(err) => {
                let reason = match GateError::from(err.clone()) {
                    GateError::CredentialExpired => DecisionReason::ExpiredCredential,
                    _ => DecisionReason::MissingCredential,
                };
                if !matches!(err, CredentialError::Expired) {
                    warn!(path, error = %err, "rejected credential on protected route");
                }
                return decision(fallback(), reason, None);
            }
        };
        let subject = Some(credential.subject().clone());

        let report = match self.status.account_status(credential.token()).await {
            Ok(report) => report,
            Err(err) => {
                let err = GateError::from(err);
                if err.is_transient() {
                    warn!(path, subject = %credential.subject(), error = %err, "status oracle failed; failing closed");
                    return decision(fallback(), DecisionReason::OracleFailure, subject);
                }
                warn!(path, subject = %credential.subject(), error = %err, "status oracle refused credential");
                return decision(fallback(), DecisionReason::NotEntitled, subject);
            }
        };

        match report {
            StatusReport::Known(AccountStatus::Suspended) => {
                if self.rules.is_suspended_notice(path) {
                    decision(Verdict::Allow, DecisionReason::SuspendedNoticeRoute, subject)
                } else {
                    decision(
                        Verdict::RedirectTo(self.rules.suspended_path.clone()),
                        DecisionReason::Suspended,
                        subject,
                    )
                }
            }
            StatusReport::Known(status) if status.needs_setup() => {
                if self.rules.is_payment_gated(path) {
                    decision(
                        Verdict::RedirectTo(self.rules.setup_fee_path.clone()),
                        DecisionReason::PaymentGated,
                        subject,
                    )
                } else {
                    decision(Verdict::Allow, DecisionReason::SetupPendingUngated, subject)
                }
            }
            StatusReport::Known(_) => decision(Verdict::Allow, DecisionReason::Entitled, subject),
            StatusReport::Unrecognized(raw) => {
                warn!(path, status = %raw, policy = ?self.unknown_status, "unrecognized account status");
                match self.unknown_status {
                    UnknownStatusPolicy::Allow => {
                        decision(Verdict::Allow, DecisionReason::UnrecognizedStatus, subject)
                    }
                    UnknownStatusPolicy::Deny => {
                        decision(fallback(), DecisionReason::UnrecognizedStatus, subject)
                    }
                }
            }
        }
    }
}
