//! Issue domain model.
//!
//! An issue is a polymorphic compliance record anchored to a subject
//! party — a driver's person-party or an equipment-party. The `kind`
//! discriminates the specialization; kind-specific fields live in the
//! flexible `detail` payload, with typed structs for the two
//! violation-bearing kinds.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum IssueKind {
    RoadsideInspection,
    Accident,
    License,
    Training,
    DrugAlcohol,
    Registration,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum IssueStatus {
    Open,
    InProgress,
    Closed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum IssuePriority {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub id: Uuid,
    /// Subject of the record: a person-party or equipment-party.
    pub party_id: Uuid,
    pub organization_id: Uuid,
    pub kind: IssueKind,
    pub status: IssueStatus,
    pub priority: IssuePriority,
    pub title: String,
    /// Kind-specific payload; see [`RoadsideInspectionDetail`] and
    /// [`AccidentDetail`].
    pub detail: serde_json::Value,
    pub occurred_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new issue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateIssue {
    pub party_id: Uuid,
    pub organization_id: Uuid,
    pub kind: IssueKind,
    pub priority: IssuePriority,
    pub title: String,
    pub detail: Option<serde_json::Value>,
    pub occurred_at: Option<DateTime<Utc>>,
}

/// Detail payload for `IssueKind::RoadsideInspection`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadsideInspectionDetail {
    pub report_number: String,
    pub inspection_date: NaiveDate,
    /// Federal inspection level, 1 through 8.
    pub level: u8,
    pub state: Option<String>,
}

/// Detail payload for `IssueKind::Accident`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccidentDetail {
    pub report_number: Option<String>,
    pub accident_date: NaiveDate,
    pub fatalities: u32,
    pub injuries: u32,
    pub tow_away: bool,
    pub hazmat_release: bool,
}
