//! Background poll bridging the delay between an external payment and the
//! subscription becoming active.
//!
//! The loop is unbounded: it stops on the first positive answer or when its
//! owner cancels it (explicitly or by dropping the [`PollHandle`]).

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use uuid::Uuid;

use tollgate_core::{GateError, SubscriptionOracle};

/// Fixed period between subscription checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// How a poll ended.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Activated,
    Cancelled,
}

/// Snapshot of one polling session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSession {
    pub id: Uuid,
    pub cancelled: bool,
    pub last_checked: Option<DateTime<Utc>>,
    pub attempts: u32,
}

impl PollSession {
    fn new() -> Self {
        Self {
            id: Uuid::now_v7(),
            cancelled: false,
            last_checked: None,
            attempts: 0,
        }
    }
}

type SharedSession = Arc<Mutex<PollSession>>;

fn with_session<R>(session: &SharedSession, f: impl FnOnce(&mut PollSession) -> R) -> R {
    let mut guard = session.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    f(&mut guard)
}

/// Starts subscription polls against one oracle.
#[derive(Clone)]
pub struct ActivationPoller {
    subscription: Arc<dyn SubscriptionOracle>,
    interval: Duration,
}

impl ActivationPoller {
    pub fn new(subscription: Arc<dyn SubscriptionOracle>) -> Self {
        Self {
            subscription,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Override the poll period. A zero period is not a valid timer and falls
    /// back to [`DEFAULT_POLL_INTERVAL`].
    pub fn with_interval(mut self, interval: Duration) -> Self {
        if interval.is_zero() {
            tracing::warn!(default_ms = DEFAULT_POLL_INTERVAL.as_millis() as u64, "zero poll interval; using default");
            self.interval = DEFAULT_POLL_INTERVAL;
        } else {
            self.interval = interval;
        }
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start polling for `token` with no activation callback.
    pub fn start(&self, token: impl Into<String>) -> PollHandle {
        self.start_with(token, || {})
    }

    /// Start polling for `token`; `on_activated` runs once, inside the poll
    /// task, on the first positive answer that arrives before cancellation.
    ///
    /// The first check happens one interval after start. Must be called from
    /// within a tokio runtime.
    pub fn start_with<F>(&self, token: impl Into<String>, on_activated: F) -> PollHandle
    where
        F: FnOnce() + Send + 'static,
    {
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let check_now = Arc::new(Notify::new());
        let session: SharedSession = Arc::new(Mutex::new(PollSession::new()));
        let id = with_session(&session, |s| s.id);

        let task = tokio::spawn(run_poll(
            self.subscription.clone(),
            token.into(),
            self.interval,
            cancel_rx,
            check_now.clone(),
            session.clone(),
            on_activated,
        ));

        tracing::info!(poll_id = %id, interval_ms = self.interval.as_millis() as u64, "activation poll started");

        PollHandle {
            cancel_tx,
            check_now,
            session,
            task: Some(task),
        }
    }
}

async fn run_poll<F>(
    subscription: Arc<dyn SubscriptionOracle>,
    token: String,
    period: Duration,
    mut cancel_rx: watch::Receiver<bool>,
    check_now: Arc<Notify>,
    session: SharedSession,
    on_activated: F,
) -> PollOutcome
where
    F: FnOnce() + Send + 'static,
{
    let id = with_session(&session, |s| s.id);
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let outcome = loop {
        tokio::select! {
            changed = cancel_rx.changed() => {
                // A dropped sender is a torn-down owner.
                if changed.is_err() || *cancel_rx.borrow() {
                    break PollOutcome::Cancelled;
                }
                continue;
            }
            _ = ticker.tick() => {}
            _ = check_now.notified() => {
                tracing::debug!(poll_id = %id, "manual subscription check");
                ticker.reset();
            }
        }

        if *cancel_rx.borrow() {
            break PollOutcome::Cancelled;
        }

        let attempt = with_session(&session, |s| {
            s.attempts += 1;
            s.last_checked = Some(Utc::now());
            s.attempts
        });

        let result = subscription.has_subscription(&token).await;

        if *cancel_rx.borrow() {
            tracing::debug!(poll_id = %id, attempt, "discarding subscription answer received after cancel");
            break PollOutcome::Cancelled;
        }

        match result {
            Ok(true) => break PollOutcome::Activated,
            Ok(false) => tracing::debug!(poll_id = %id, attempt, "subscription not active yet"),
            Err(e) => {
                let e = GateError::from(e);
                tracing::warn!(poll_id = %id, attempt, error = %e, "subscription check failed; will retry");
            }
        }
    };

    with_session(&session, |s| s.cancelled = outcome == PollOutcome::Cancelled);

    match outcome {
        PollOutcome::Activated => {
            tracing::info!(poll_id = %id, "subscription activated");
            on_activated();
        }
        PollOutcome::Cancelled => tracing::info!(poll_id = %id, "activation poll cancelled"),
    }
    outcome
}

/// Owner's handle on a running poll. Dropping it cancels the poll.
pub struct PollHandle {
    cancel_tx: watch::Sender<bool>,
    check_now: Arc<Notify>,
    session: SharedSession,
    task: Option<JoinHandle<PollOutcome>>,
}

impl PollHandle {
    /// Check immediately instead of waiting for the next tick.
    pub fn check_now(&self) {
        self.check_now.notify_one();
    }

    /// Cooperative cancel: no new check starts, and an answer still in
    /// flight is discarded.
    pub fn cancel(&self) {
        self.cancel_tx.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel_tx.borrow()
    }

    pub fn session(&self) -> PollSession {
        with_session(&self.session, |s| s.clone())
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(|task| task.is_finished())
    }

    /// Wait for the poll to end.
    ///
    /// A panic inside the poll task is re-raised here rather than reported
    /// as a cancel.
    pub async fn join(mut self) -> PollOutcome {
        let Some(task) = self.task.take() else {
            return PollOutcome::Cancelled;
        };
        match task.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_panic() => {
                tracing::error!("activation poll task panicked");
                std::panic::resume_unwind(e.into_panic())
            }
            Err(_) => PollOutcome::Cancelled,
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel_tx.send_replace(true);
    }
}
