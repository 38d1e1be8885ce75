use tollgate_core::{RouteClass, SubjectId};

use crate::edge::{DecisionReason, EdgeDecision};

/// Edge gate context for a request that was allowed through.
///
/// Inserted into request extensions by the edge middleware; immutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateContext {
    route_class: RouteClass,
    reason: DecisionReason,
    subject: Option<SubjectId>,
}

impl GateContext {
    pub fn new(route_class: RouteClass, reason: DecisionReason, subject: Option<SubjectId>) -> Self {
        Self {
            route_class,
            reason,
            subject,
        }
    }

    pub fn route_class(&self) -> RouteClass {
        self.route_class
    }

    pub fn reason(&self) -> DecisionReason {
        self.reason
    }

    /// Set only for protected routes, where the credential was decoded.
    pub fn subject(&self) -> Option<&SubjectId> {
        self.subject.as_ref()
    }
}

impl From<&EdgeDecision> for GateContext {
    fn from(decision: &EdgeDecision) -> Self {
        Self::new(decision.route_class, decision.reason, decision.subject.clone())
    }
}
