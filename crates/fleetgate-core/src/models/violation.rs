//! Violation domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A cited violation attached to a roadside-inspection or accident
/// issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    pub id: Uuid,
    pub issue_id: Uuid,
    /// FMCSR part/section, e.g. `393.9` or `395.8(e)`.
    pub code: String,
    pub description: String,
    pub out_of_service: bool,
    /// CSA severity weight, 1 through 10, when known.
    pub severity_weight: Option<u8>,
    /// Which unit the citation applies to (1 = power unit, 2 = trailer).
    pub unit: Option<u8>,
    pub created_at: DateTime<Utc>,
}

/// Fields required to record a new violation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateViolation {
    pub issue_id: Uuid,
    pub code: String,
    pub description: String,
    pub out_of_service: bool,
    pub severity_weight: Option<u8>,
    pub unit: Option<u8>,
}
