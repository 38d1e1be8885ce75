//! Client-side activation gate: the second, finer-grained check that runs
//! when a protected page tree mounts.
//!
//! Phases follow `Checking -> {Proceed, Redirecting, Polling -> {Proceed, Redirecting}}`
//! and are published on a watch channel for the UI to render from.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::watch;

use tollgate_auth::Credential;
use tollgate_core::{AccountStatus, GateError, RouteClass, RouteRules, StatusOracle, StatusReport, SubscriptionOracle};

use crate::poller::{ActivationPoller, PollHandle};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", content = "location", rename_all = "snake_case")]
pub enum GatePhase {
    Checking,
    Proceed,
    Redirecting(String),
    Polling,
}

impl GatePhase {
    /// Children render only in this phase.
    pub fn is_proceed(&self) -> bool {
        matches!(self, GatePhase::Proceed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientVerdict {
    Proceed,
    RedirectTo(String),
}

/// UI collaborator that performs client-side navigations.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);
}

pub struct ClientActivationGate {
    rules: RouteRules,
    status: Arc<dyn StatusOracle>,
    subscription: Arc<dyn SubscriptionOracle>,
    poller: ActivationPoller,
    phase: Arc<watch::Sender<GatePhase>>,
}

impl ClientActivationGate {
    pub fn new(
        rules: RouteRules,
        status: Arc<dyn StatusOracle>,
        subscription: Arc<dyn SubscriptionOracle>,
    ) -> Self {
        let (phase, _) = watch::channel(GatePhase::Checking);
        Self {
            rules,
            status,
            poller: ActivationPoller::new(subscription.clone()),
            subscription,
            phase: Arc::new(phase),
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poller = self.poller.with_interval(interval);
        self
    }

    pub fn rules(&self) -> &RouteRules {
        &self.rules
    }

    pub fn phase(&self) -> GatePhase {
        self.phase.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<GatePhase> {
        self.phase.subscribe()
    }

    fn enter(&self, phase: GatePhase) {
        tracing::debug!(?phase, "client gate phase");
        self.phase.send_replace(phase);
    }

    fn settle(&self, verdict: ClientVerdict) -> ClientVerdict {
        self.enter(match &verdict {
            ClientVerdict::Proceed => GatePhase::Proceed,
            ClientVerdict::RedirectTo(to) => GatePhase::Redirecting(to.clone()),
        });
        verdict
    }

    /// Decide whether the page tree at `path` may render for `credential`.
    ///
    /// The status check always completes before the subscription check, and
    /// only an entitled status ever reaches the subscription oracle.
    pub async fn check(&self, path: &str, credential: &Credential) -> ClientVerdict {
        self.enter(GatePhase::Checking);

        let route_class = self.rules.classify(path);
        match route_class {
            RouteClass::OnboardingFlow | RouteClass::Public | RouteClass::SuspendedNotice => {
                return self.settle(ClientVerdict::Proceed);
            }
            RouteClass::Protected if self.rules.is_subscribe_path(path) => {
                return self.settle(ClientVerdict::Proceed);
            }
            RouteClass::Protected => {}
        }

        let fallback = || ClientVerdict::RedirectTo(self.rules.fallback_path.clone());

        if credential.is_expired(Utc::now()) {
            tracing::warn!(path, subject = %credential.subject(), "credential expired before mount");
            return self.settle(fallback());
        }

        let report = match self.status.account_status(credential.token()).await {
            Ok(report) => report,
            Err(e) => {
                let e = GateError::from(e);
                tracing::warn!(path, error = %e, "status check failed; not entitled");
                return self.settle(fallback());
            }
        };

        match report {
            StatusReport::Known(AccountStatus::Suspended) => {
                return self.settle(ClientVerdict::RedirectTo(self.rules.suspended_path.clone()));
            }
            StatusReport::Known(status) if status.needs_setup() => {
                tracing::debug!(path, status = status.as_str(), "account still onboarding");
                return self.settle(ClientVerdict::RedirectTo(self.rules.onboarding_prefix.clone()));
            }
            StatusReport::Known(_) => {}
            StatusReport::Unrecognized(raw) => {
                tracing::warn!(path, status = %raw, "unrecognized account status; not entitled");
                return self.settle(fallback());
            }
        }

        match self.subscription.has_subscription(credential.token()).await {
            Ok(true) => self.settle(ClientVerdict::Proceed),
            Ok(false) => self.settle(ClientVerdict::RedirectTo(self.rules.subscribe_path.clone())),
            Err(e) => {
                let e = GateError::from(e);
                tracing::warn!(path, error = %e, "subscription check failed; not entitled");
                self.settle(fallback())
            }
        }
    }

    /// [`Self::check`], then navigate if the verdict is a redirect.
    pub async fn mount(&self, path: &str, credential: &Credential, navigator: &dyn Navigator) -> ClientVerdict {
        let verdict = self.check(path, credential).await;
        if let ClientVerdict::RedirectTo(to) = &verdict {
            navigator.navigate(to);
        }
        verdict
    }

    /// Start the post-payment poll. On activation the gate moves to
    /// `Redirecting(entry)` and navigates to the protected entry point.
    ///
    /// The caller owns the returned handle; dropping it (teardown) cancels.
    pub fn begin_activation(&self, credential: &Credential, navigator: Arc<dyn Navigator>) -> PollHandle {
        self.enter(GatePhase::Polling);

        let phase = self.phase.clone();
        let entry = self.rules.entry_path.clone();
        self.poller.start_with(credential.token(), move || {
            phase.send_replace(GatePhase::Redirecting(entry.clone()));
            navigator.navigate(&entry);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;
    use tollgate_auth::CredentialClaims;
    use tollgate_core::OracleError;

    use crate::poller::PollOutcome;

    struct StatusMock {
        answer: Result<StatusReport, OracleError>,
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl StatusOracle for StatusMock {
        async fn account_status(&self, _token: &str) -> Result<StatusReport, OracleError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.answer.clone()
        }
    }

    /// `false` for the first `pending` calls, then `true`.
    struct SubscriptionMock {
        pending: usize,
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl SubscriptionOracle for SubscriptionMock {
        async fn has_subscription(&self, _token: &str) -> Result<bool, OracleError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(n >= self.pending)
        }
    }

    #[derive(Default)]
    struct RecordingNavigator {
        visited: Mutex<Vec<String>>,
    }

    impl Navigator for RecordingNavigator {
        fn navigate(&self, path: &str) {
            self.visited.lock().unwrap().push(path.to_string());
        }
    }

    impl RecordingNavigator {
        fn visited(&self) -> Vec<String> {
            self.visited.lock().unwrap().clone()
        }
    }

    fn credential(exp: i64) -> Credential {
        let claims: CredentialClaims = serde_json::from_value(json!({ "sub": "acct-1", "exp": exp })).unwrap();
        Credential::new("tok", claims)
    }

    fn live() -> Credential {
        credential(4_000_000_000)
    }

    struct Fixture {
        gate: ClientActivationGate,
        status: Arc<StatusMock>,
        subscription: Arc<SubscriptionMock>,
    }

    fn fixture(status: Result<StatusReport, OracleError>, pending: usize) -> Fixture {
        let status = Arc::new(StatusMock {
            answer: status,
            calls: AtomicUsize::new(0),
        });
        let subscription = Arc::new(SubscriptionMock {
            pending,
            calls: AtomicUsize::new(0),
        });
        let gate = ClientActivationGate::new(RouteRules::default(), status.clone(), subscription.clone());
        Fixture {
            gate,
            status,
            subscription,
        }
    }

    fn redirect(to: &str) -> ClientVerdict {
        ClientVerdict::RedirectTo(to.to_string())
    }

    #[tokio::test]
    async fn onboarding_and_subscribe_paths_proceed_without_oracle_calls() {
        let f = fixture(Ok(AccountStatus::Suspended.into()), 0);
        for path in ["/onboarding", "/onboarding/setup-fee", "/subscribe", "/login"] {
            assert_eq!(f.gate.check(path, &live()).await, ClientVerdict::Proceed, "{path}");
        }
        assert_eq!(f.status.calls.load(Ordering::SeqCst), 0);
        assert_eq!(f.subscription.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn subscription_is_never_checked_unless_status_is_entitled() {
        let not_entitled: Vec<Result<StatusReport, OracleError>> = vec![
            Ok(AccountStatus::PassiveNoPayment.into()),
            Ok(AccountStatus::PendingApproval.into()),
            Ok(AccountStatus::Rejected.into()),
            Ok(AccountStatus::Suspended.into()),
            Ok(StatusReport::Unrecognized("ARCHIVED".into())),
            Err(OracleError::Unreachable("timeout".into())),
            Err(OracleError::malformed("no status field")),
        ];

        for answer in not_entitled {
            let f = fixture(answer.clone(), 0);
            let verdict = f.gate.check("/dashboard", &live()).await;
            assert!(matches!(verdict, ClientVerdict::RedirectTo(_)), "{answer:?}");
            assert_eq!(f.status.calls.load(Ordering::SeqCst), 1);
            assert_eq!(f.subscription.calls.load(Ordering::SeqCst), 0, "{answer:?}");
        }

        for status in [AccountStatus::ActiveReady, AccountStatus::Subscribed] {
            let f = fixture(Ok(status.into()), 0);
            assert_eq!(f.gate.check("/dashboard", &live()).await, ClientVerdict::Proceed);
            assert_eq!(f.subscription.calls.load(Ordering::SeqCst), 1);
        }
    }

    #[tokio::test]
    async fn redirect_targets_follow_the_status() {
        let cases: [(Result<StatusReport, OracleError>, ClientVerdict); 3] = [
            (Ok(AccountStatus::PendingApproval.into()), redirect("/onboarding")),
            (Ok(AccountStatus::Suspended.into()), redirect("/suspended")),
            (Err(OracleError::Status(500)), redirect("/")),
        ];
        for (answer, expected) in cases {
            let f = fixture(answer, 0);
            assert_eq!(f.gate.check("/settings", &live()).await, expected);
            assert_eq!(f.gate.phase(), match expected {
                ClientVerdict::RedirectTo(to) => GatePhase::Redirecting(to),
                ClientVerdict::Proceed => GatePhase::Proceed,
            });
        }
    }

    #[tokio::test]
    async fn missing_subscription_redirects_to_subscribe() {
        let f = fixture(Ok(AccountStatus::ActiveReady.into()), 1);
        let nav = RecordingNavigator::default();

        assert_eq!(f.gate.mount("/dashboard", &live(), &nav).await, redirect("/subscribe"));
        assert_eq!(nav.visited(), vec!["/subscribe".to_string()]);
    }

    #[tokio::test]
    async fn expired_credential_never_reaches_the_oracles() {
        let f = fixture(Ok(AccountStatus::Subscribed.into()), 0);
        assert_eq!(f.gate.check("/dashboard", &credential(1)).await, redirect("/"));
        assert_eq!(f.status.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn phases_are_observable() {
        let f = fixture(Ok(AccountStatus::Subscribed.into()), 0);
        let rx = f.gate.subscribe();
        assert_eq!(*rx.borrow(), GatePhase::Checking);

        f.gate.check("/dashboard", &live()).await;
        assert!(rx.borrow().is_proceed());
        assert_eq!(
            serde_json::to_value(GatePhase::Redirecting("/subscribe".into())).unwrap(),
            json!({ "phase": "redirecting", "location": "/subscribe" })
        );
    }

    #[tokio::test(start_paused = true)]
    async fn activation_poll_navigates_to_entry_point() {
        let f = fixture(Ok(AccountStatus::ActiveReady.into()), 2);
        let nav = Arc::new(RecordingNavigator::default());

        let handle = f.gate.begin_activation(&live(), nav.clone());
        assert_eq!(f.gate.phase(), GatePhase::Polling);

        assert_eq!(handle.join().await, PollOutcome::Activated);
        assert_eq!(f.subscription.calls.load(Ordering::SeqCst), 3);
        assert_eq!(f.gate.phase(), GatePhase::Redirecting("/dashboard".into()));
        assert_eq!(nav.visited(), vec!["/dashboard".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_poll_interval_still_activates() {
        let f = fixture(Ok(AccountStatus::ActiveReady.into()), 1);
        let gate = f.gate.with_poll_interval(Duration::ZERO);
        let nav = Arc::new(RecordingNavigator::default());

        let handle = gate.begin_activation(&live(), nav.clone());
        assert_eq!(handle.join().await, PollOutcome::Activated);
        assert_eq!(f.subscription.calls.load(Ordering::SeqCst), 2);
        assert_eq!(nav.visited(), vec!["/dashboard".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn torn_down_poll_never_navigates() {
        let f = fixture(Ok(AccountStatus::ActiveReady.into()), usize::MAX);
        let nav = Arc::new(RecordingNavigator::default());

        let handle = f.gate.begin_activation(&live(), nav.clone());
        tokio::time::sleep(Duration::from_secs(7)).await;
        drop(handle);
        tokio::time::sleep(Duration::from_secs(30)).await;

        assert_eq!(f.subscription.calls.load(Ordering::SeqCst), 2);
        assert!(nav.visited().is_empty());
    }
}
