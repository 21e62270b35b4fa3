//! SurrealDB implementation of [`CafRepository`].

use chrono::{DateTime, Utc};
use fleetgate_core::error::FleetgateResult;
use fleetgate_core::models::caf::{CafStatus, CorrectiveActionForm, CreateCaf};
use fleetgate_core::repository::{CafRepository, PaginatedResult, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, date_string, parse_opt_date, parse_opt_uuid, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct CafRow {
    organization_id: String,
    issue_id: String,
    violation_ids: Vec<String>,
    code: String,
    status: String,
    assigned_party_id: Option<String>,
    due_date: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct CafRowWithId {
    record_id: String,
    organization_id: String,
    issue_id: String,
    violation_ids: Vec<String>,
    code: String,
    status: String,
    assigned_party_id: Option<String>,
    due_date: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_caf_status(s: &str) -> Result<CafStatus, DbError> {
    match s {
        "Draft" => Ok(CafStatus::Draft),
        "Assigned" => Ok(CafStatus::Assigned),
        "Completed" => Ok(CafStatus::Completed),
        "Closed" => Ok(CafStatus::Closed),
        other => Err(DbError::Decode(format!("unknown caf status: {other}"))),
    }
}

fn caf_status_to_string(status: CafStatus) -> &'static str {
    match status {
        CafStatus::Draft => "Draft",
        CafStatus::Assigned => "Assigned",
        CafStatus::Completed => "Completed",
        CafStatus::Closed => "Closed",
    }
}

impl CafRow {
    fn into_caf(self, id: Uuid) -> Result<CorrectiveActionForm, DbError> {
        let violation_ids = self
            .violation_ids
            .iter()
            .map(|v| parse_uuid("violation", v))
            .collect::<Result<Vec<_>, DbError>>()?;
        Ok(CorrectiveActionForm {
            id,
            organization_id: parse_uuid("organization", &self.organization_id)?,
            issue_id: parse_uuid("issue", &self.issue_id)?,
            violation_ids,
            code: self.code,
            status: parse_caf_status(&self.status)?,
            assigned_party_id: parse_opt_uuid("party", self.assigned_party_id)?,
            due_date: parse_opt_date("due_date", self.due_date)?,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl CafRowWithId {
    fn try_into_caf(self) -> Result<CorrectiveActionForm, DbError> {
        let id = parse_uuid("caf", &self.record_id)?;
        CafRow {
            organization_id: self.organization_id,
            issue_id: self.issue_id,
            violation_ids: self.violation_ids,
            code: self.code,
            status: self.status,
            assigned_party_id: self.assigned_party_id,
            due_date: self.due_date,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_caf(id)
    }
}

/// SurrealDB implementation of the CAF repository.
#[derive(Clone)]
pub struct SurrealCafRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealCafRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> CafRepository for SurrealCafRepository<C> {
    async fn create(&self, input: CreateCaf) -> FleetgateResult<CorrectiveActionForm> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let violation_ids: Vec<String> =
            input.violation_ids.iter().map(|v| v.to_string()).collect();

        let result = self
            .db
            .query(
                "CREATE type::record('caf', $id) SET \
                 organization_id = $organization_id, \
                 issue_id = $issue_id, \
                 violation_ids = $violation_ids, code = $code, \
                 status = 'Draft', \
                 assigned_party_id = $assigned_party_id, \
                 due_date = $due_date, notes = $notes",
            )
            .bind(("id", id_str.clone()))
            .bind(("organization_id", input.organization_id.to_string()))
            .bind(("issue_id", input.issue_id.to_string()))
            .bind(("violation_ids", violation_ids))
            .bind(("code", input.code))
            .bind((
                "assigned_party_id",
                input.assigned_party_id.map(|p| p.to_string()),
            ))
            .bind(("due_date", date_string(input.due_date)))
            .bind(("notes", input.notes))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<CafRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "caf".into(),
            id: id_str,
        })?;

        Ok(row.into_caf(id)?)
    }

    async fn get_by_id(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> FleetgateResult<CorrectiveActionForm> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('caf', $id) \
                 WHERE organization_id = $organization_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("organization_id", organization_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CafRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "caf".into(),
            id: id_str,
        })?;

        Ok(row.into_caf(id)?)
    }

    async fn set_status(
        &self,
        organization_id: Uuid,
        id: Uuid,
        status: CafStatus,
    ) -> FleetgateResult<CorrectiveActionForm> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('caf', $id) SET \
                 status = $status, updated_at = time::now() \
                 WHERE organization_id = $organization_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("organization_id", organization_id.to_string()))
            .bind(("status", caf_status_to_string(status)))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<CafRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "caf".into(),
            id: id_str,
        })?;

        Ok(row.into_caf(id)?)
    }

    async fn list_by_organization(
        &self,
        organization_id: Uuid,
        pagination: Pagination,
    ) -> FleetgateResult<PaginatedResult<CorrectiveActionForm>> {
        let organization_id_str = organization_id.to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM caf \
                 WHERE organization_id = $organization_id GROUP ALL",
            )
            .bind(("organization_id", organization_id_str.clone()))
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM caf \
                 WHERE organization_id = $organization_id \
                 ORDER BY created_at DESC \
                 LIMIT $limit START $offset",
            )
            .bind(("organization_id", organization_id_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CafRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_caf())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn find_covering_violation(
        &self,
        violation_id: Uuid,
    ) -> FleetgateResult<Option<CorrectiveActionForm>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM caf \
                 WHERE violation_ids CONTAINS $violation_id \
                 LIMIT 1",
            )
            .bind(("violation_id", violation_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CafRowWithId> = result.take(0).map_err(DbError::from)?;

        rows.into_iter()
            .next()
            .map(|row| row.try_into_caf().map_err(Into::into))
            .transpose()
    }
}
