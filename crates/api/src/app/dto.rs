use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tollgate_core::{RouteClass, SubjectId};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct DecisionQuery {
    pub path: String,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub subject: SubjectId,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Stand-in body for pages; real page rendering lives outside the gate.
#[derive(Debug, Serialize)]
pub struct PageResponse {
    pub path: String,
    pub route_class: RouteClass,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<SubjectId>,
}
