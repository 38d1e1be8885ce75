//! `tollgate-client`
//!
//! **Responsibility:** client tier of the gate.
//!
//! This crate provides:
//! - the activation gate that runs when a protected page tree mounts
//! - the cancellable post-payment subscription poll
//! - the session-owned permission cache, navigation filtering and page guard
//!
//! Route classification comes from `tollgate-core`, shared with the edge.

pub mod activation;
pub mod guard;
pub mod navigation;
pub mod poller;
pub mod session;

pub use activation::{ClientActivationGate, ClientVerdict, GatePhase, Navigator};
pub use guard::{PageAccess, guard_page};
pub use navigation::{NavGroup, NavItem, filter_navigation};
pub use poller::{ActivationPoller, DEFAULT_POLL_INTERVAL, PollHandle, PollOutcome, PollSession};
pub use session::ClientSession;
