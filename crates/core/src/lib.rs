//! `tollgate-core`: shared gate vocabulary.
//!
//! Account lifecycle, route classification, module identifiers, the error
//! taxonomy and the oracle seams. This crate is pure: no IO, no logging.

pub mod error;
pub mod id;
pub mod oracle;
pub mod route;
pub mod status;

pub use error::{GateError, GateResult};
pub use id::{ModuleId, SubjectId};
pub use oracle::{ModuleAccess, OracleError, PermissionOracle, StatusOracle, SubscriptionOracle};
pub use route::{RouteClass, RouteRules, classify_route};
pub use status::{AccountStatus, StatusReport, UnknownStatus};
