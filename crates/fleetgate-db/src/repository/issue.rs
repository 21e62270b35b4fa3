//! SurrealDB implementation of [`IssueRepository`].

use chrono::{DateTime, Utc};
use fleetgate_core::error::FleetgateResult;
use fleetgate_core::models::issue::{CreateIssue, Issue, IssueKind, IssuePriority, IssueStatus};
use fleetgate_core::repository::{IssueRepository, PaginatedResult, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct IssueRow {
    party_id: String,
    organization_id: String,
    kind: String,
    status: String,
    priority: String,
    title: String,
    detail: serde_json::Value,
    occurred_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct IssueRowWithId {
    record_id: String,
    party_id: String,
    organization_id: String,
    kind: String,
    status: String,
    priority: String,
    title: String,
    detail: serde_json::Value,
    occurred_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

pub(crate) fn parse_issue_kind(s: &str) -> Result<IssueKind, DbError> {
    match s {
        "RoadsideInspection" => Ok(IssueKind::RoadsideInspection),
        "Accident" => Ok(IssueKind::Accident),
        "License" => Ok(IssueKind::License),
        "Training" => Ok(IssueKind::Training),
        "DrugAlcohol" => Ok(IssueKind::DrugAlcohol),
        "Registration" => Ok(IssueKind::Registration),
        other => Err(DbError::Decode(format!("unknown issue kind: {other}"))),
    }
}

pub(crate) fn issue_kind_to_string(kind: IssueKind) -> &'static str {
    match kind {
        IssueKind::RoadsideInspection => "RoadsideInspection",
        IssueKind::Accident => "Accident",
        IssueKind::License => "License",
        IssueKind::Training => "Training",
        IssueKind::DrugAlcohol => "DrugAlcohol",
        IssueKind::Registration => "Registration",
    }
}

fn parse_issue_status(s: &str) -> Result<IssueStatus, DbError> {
    match s {
        "Open" => Ok(IssueStatus::Open),
        "InProgress" => Ok(IssueStatus::InProgress),
        "Closed" => Ok(IssueStatus::Closed),
        other => Err(DbError::Decode(format!("unknown issue status: {other}"))),
    }
}

fn issue_status_to_string(status: IssueStatus) -> &'static str {
    match status {
        IssueStatus::Open => "Open",
        IssueStatus::InProgress => "InProgress",
        IssueStatus::Closed => "Closed",
    }
}

fn parse_issue_priority(s: &str) -> Result<IssuePriority, DbError> {
    match s {
        "Low" => Ok(IssuePriority::Low),
        "Medium" => Ok(IssuePriority::Medium),
        "High" => Ok(IssuePriority::High),
        "Critical" => Ok(IssuePriority::Critical),
        other => Err(DbError::Decode(format!("unknown issue priority: {other}"))),
    }
}

fn issue_priority_to_string(priority: IssuePriority) -> &'static str {
    match priority {
        IssuePriority::Low => "Low",
        IssuePriority::Medium => "Medium",
        IssuePriority::High => "High",
        IssuePriority::Critical => "Critical",
    }
}

impl IssueRow {
    fn into_issue(self, id: Uuid) -> Result<Issue, DbError> {
        Ok(Issue {
            id,
            party_id: parse_uuid("party", &self.party_id)?,
            organization_id: parse_uuid("organization", &self.organization_id)?,
            kind: parse_issue_kind(&self.kind)?,
            status: parse_issue_status(&self.status)?,
            priority: parse_issue_priority(&self.priority)?,
            title: self.title,
            detail: self.detail,
            occurred_at: self.occurred_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl IssueRowWithId {
    fn try_into_issue(self) -> Result<Issue, DbError> {
        let id = parse_uuid("issue", &self.record_id)?;
        IssueRow {
            party_id: self.party_id,
            organization_id: self.organization_id,
            kind: self.kind,
            status: self.status,
            priority: self.priority,
            title: self.title,
            detail: self.detail,
            occurred_at: self.occurred_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_issue(id)
    }
}

/// SurrealDB implementation of the Issue repository.
#[derive(Clone)]
pub struct SurrealIssueRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealIssueRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> IssueRepository for SurrealIssueRepository<C> {
    async fn create(&self, input: CreateIssue) -> FleetgateResult<Issue> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('issue', $id) SET \
                 party_id = $party_id, \
                 organization_id = $organization_id, \
                 kind = $kind, status = 'Open', priority = $priority, \
                 title = $title, detail = $detail, \
                 occurred_at = $occurred_at",
            )
            .bind(("id", id_str.clone()))
            .bind(("party_id", input.party_id.to_string()))
            .bind(("organization_id", input.organization_id.to_string()))
            .bind(("kind", issue_kind_to_string(input.kind)))
            .bind(("priority", issue_priority_to_string(input.priority)))
            .bind(("title", input.title))
            .bind((
                "detail",
                input.detail.unwrap_or_else(|| serde_json::json!({})),
            ))
            .bind(("occurred_at", input.occurred_at))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<IssueRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "issue".into(),
            id: id_str,
        })?;

        Ok(row.into_issue(id)?)
    }

    async fn get_by_id(&self, organization_id: Uuid, id: Uuid) -> FleetgateResult<Issue> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('issue', $id) \
                 WHERE organization_id = $organization_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("organization_id", organization_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<IssueRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "issue".into(),
            id: id_str,
        })?;

        Ok(row.into_issue(id)?)
    }

    async fn set_status(
        &self,
        organization_id: Uuid,
        id: Uuid,
        status: IssueStatus,
    ) -> FleetgateResult<Issue> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('issue', $id) SET \
                 status = $status, updated_at = time::now() \
                 WHERE organization_id = $organization_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("organization_id", organization_id.to_string()))
            .bind(("status", issue_status_to_string(status)))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<IssueRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "issue".into(),
            id: id_str,
        })?;

        Ok(row.into_issue(id)?)
    }

    async fn list_by_parties(
        &self,
        party_ids: &[Uuid],
        kind: Option<IssueKind>,
        pagination: Pagination,
    ) -> FleetgateResult<PaginatedResult<Issue>> {
        // An empty cohort can only yield an empty page.
        if party_ids.is_empty() {
            return Ok(PaginatedResult {
                items: Vec::new(),
                total: 0,
                offset: pagination.offset,
                limit: pagination.limit,
            });
        }

        let party_id_strings: Vec<String> = party_ids.iter().map(|p| p.to_string()).collect();
        let kind_clause = if kind.is_some() {
            " AND kind = $kind"
        } else {
            ""
        };

        let count_query = format!(
            "SELECT count() AS total FROM issue \
             WHERE party_id IN $party_ids{kind_clause} GROUP ALL"
        );
        let mut count_builder = self
            .db
            .query(&count_query)
            .bind(("party_ids", party_id_strings.clone()));
        if let Some(kind) = kind {
            count_builder = count_builder.bind(("kind", issue_kind_to_string(kind)));
        }
        let mut count_result = count_builder.await.map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let page_query = format!(
            "SELECT meta::id(id) AS record_id, * FROM issue \
             WHERE party_id IN $party_ids{kind_clause} \
             ORDER BY created_at DESC \
             LIMIT $limit START $offset"
        );
        let mut page_builder = self
            .db
            .query(&page_query)
            .bind(("party_ids", party_id_strings))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset));
        if let Some(kind) = kind {
            page_builder = page_builder.bind(("kind", issue_kind_to_string(kind)));
        }
        let mut result = page_builder.await.map_err(DbError::from)?;

        let rows: Vec<IssueRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_issue())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
