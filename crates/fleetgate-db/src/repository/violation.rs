//! SurrealDB implementation of [`ViolationRepository`].

use chrono::{DateTime, Utc};
use fleetgate_core::error::FleetgateResult;
use fleetgate_core::models::violation::{CreateViolation, Violation};
use fleetgate_core::repository::ViolationRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::parse_uuid;
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct ViolationRow {
    issue_id: String,
    code: String,
    description: String,
    out_of_service: bool,
    severity_weight: Option<u8>,
    unit: Option<u8>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct ViolationRowWithId {
    record_id: String,
    issue_id: String,
    code: String,
    description: String,
    out_of_service: bool,
    severity_weight: Option<u8>,
    unit: Option<u8>,
    created_at: DateTime<Utc>,
}

impl ViolationRow {
    fn into_violation(self, id: Uuid) -> Result<Violation, DbError> {
        Ok(Violation {
            id,
            issue_id: parse_uuid("issue", &self.issue_id)?,
            code: self.code,
            description: self.description,
            out_of_service: self.out_of_service,
            severity_weight: self.severity_weight,
            unit: self.unit,
            created_at: self.created_at,
        })
    }
}

impl ViolationRowWithId {
    fn try_into_violation(self) -> Result<Violation, DbError> {
        let id = parse_uuid("violation", &self.record_id)?;
        ViolationRow {
            issue_id: self.issue_id,
            code: self.code,
            description: self.description,
            out_of_service: self.out_of_service,
            severity_weight: self.severity_weight,
            unit: self.unit,
            created_at: self.created_at,
        }
        .into_violation(id)
    }
}

/// SurrealDB implementation of the Violation repository.
#[derive(Clone)]
pub struct SurrealViolationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealViolationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ViolationRepository for SurrealViolationRepository<C> {
    async fn create(&self, input: CreateViolation) -> FleetgateResult<Violation> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('violation', $id) SET \
                 issue_id = $issue_id, code = $code, \
                 description = $description, \
                 out_of_service = $out_of_service, \
                 severity_weight = $severity_weight, unit = $unit",
            )
            .bind(("id", id_str.clone()))
            .bind(("issue_id", input.issue_id.to_string()))
            .bind(("code", input.code))
            .bind(("description", input.description))
            .bind(("out_of_service", input.out_of_service))
            .bind(("severity_weight", input.severity_weight))
            .bind(("unit", input.unit))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<ViolationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "violation".into(),
            id: id_str,
        })?;

        Ok(row.into_violation(id)?)
    }

    async fn list_by_issue(&self, issue_id: Uuid) -> FleetgateResult<Vec<Violation>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM violation \
                 WHERE issue_id = $issue_id \
                 ORDER BY code ASC",
            )
            .bind(("issue_id", issue_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ViolationRowWithId> = result.take(0).map_err(DbError::from)?;

        let violations = rows
            .into_iter()
            .map(|row| row.try_into_violation())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(violations)
    }
}
