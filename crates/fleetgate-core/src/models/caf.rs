//! Corrective action form (CAF) domain model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CafStatus {
    Draft,
    Assigned,
    Completed,
    Closed,
}

/// A remediation record generated from one or more violations of a
/// single issue, scoped to the issue's organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectiveActionForm {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub issue_id: Uuid,
    /// Violations this form remediates. Generation groups violations by
    /// regulation code, so all linked violations share one code.
    pub violation_ids: Vec<Uuid>,
    /// The shared regulation code of the linked violations.
    pub code: String,
    pub status: CafStatus,
    /// Party responsible for carrying out the corrective action.
    pub assigned_party_id: Option<Uuid>,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new corrective action form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCaf {
    pub organization_id: Uuid,
    pub issue_id: Uuid,
    pub violation_ids: Vec<Uuid>,
    pub code: String,
    pub assigned_party_id: Option<Uuid>,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
}
