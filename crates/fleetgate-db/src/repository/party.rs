//! SurrealDB implementation of [`PartyRepository`].

use chrono::{DateTime, Utc};
use fleetgate_core::error::{FleetgateError, FleetgateResult};
use fleetgate_core::models::party::{Party, PartyKind, PartyStatus};
use fleetgate_core::repository::PartyRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct PartyRow {
    external_user_id: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct PartyRowWithId {
    record_id: String,
    external_user_id: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

pub(crate) fn parse_party_status(s: &str) -> Result<PartyStatus, DbError> {
    match s {
        "Active" => Ok(PartyStatus::Active),
        "Inactive" => Ok(PartyStatus::Inactive),
        other => Err(DbError::Decode(format!("unknown party status: {other}"))),
    }
}

pub(crate) fn party_status_to_string(s: PartyStatus) -> &'static str {
    match s {
        PartyStatus::Active => "Active",
        PartyStatus::Inactive => "Inactive",
    }
}

impl PartyRow {
    fn into_party(self, id: Uuid) -> Result<Party, DbError> {
        Ok(Party {
            id,
            external_user_id: self.external_user_id,
            status: parse_party_status(&self.status)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl PartyRowWithId {
    fn try_into_party(self) -> Result<Party, DbError> {
        let id = parse_uuid("party", &self.record_id)?;
        Ok(Party {
            id,
            external_user_id: self.external_user_id,
            status: parse_party_status(&self.status)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Party repository.
#[derive(Clone)]
pub struct SurrealPartyRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPartyRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> PartyRepository for SurrealPartyRepository<C> {
    async fn find_by_principal(&self, external_user_id: &str) -> FleetgateResult<Vec<Party>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM party \
                 WHERE external_user_id = $external_user_id",
            )
            .bind(("external_user_id", external_user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PartyRowWithId> = result.take(0).map_err(DbError::from)?;

        let parties = rows
            .into_iter()
            .map(|row| row.try_into_party())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(parties)
    }

    async fn get_by_id(&self, id: Uuid) -> FleetgateResult<Party> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('party', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PartyRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "party".into(),
            id: id_str,
        })?;

        Ok(row.into_party(id)?)
    }

    async fn kind_of(&self, id: Uuid) -> FleetgateResult<Option<PartyKind>> {
        let id_str = id.to_string();

        // One count per kind-defining table, in a fixed order.
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM person \
                 WHERE party_id = $party_id GROUP ALL; \
                 SELECT count() AS total FROM organization \
                 WHERE party_id = $party_id GROUP ALL; \
                 SELECT count() AS total FROM equipment \
                 WHERE party_id = $party_id GROUP ALL; \
                 SELECT count() AS total FROM consultant \
                 WHERE party_id = $party_id GROUP ALL;",
            )
            .bind(("party_id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let kinds = [
            PartyKind::Person,
            PartyKind::Organization,
            PartyKind::Equipment,
            PartyKind::Consultant,
        ];
        let mut owned = Vec::new();
        for (index, kind) in kinds.into_iter().enumerate() {
            let rows: Vec<CountRow> = result.take(index).map_err(DbError::from)?;
            if rows.first().map(|r| r.total).unwrap_or(0) > 0 {
                owned.push(kind);
            }
        }

        match owned.as_slice() {
            [] => Ok(None),
            [kind] => Ok(Some(*kind)),
            many => Err(FleetgateError::Integrity {
                detail: format!("party {id_str} owns {} kind-defining records", many.len()),
            }),
        }
    }

    async fn set_status(&self, id: Uuid, status: PartyStatus) -> FleetgateResult<Party> {
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "UPDATE type::record('party', $id) SET \
                 status = $status, updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .bind(("status", party_status_to_string(status)))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<PartyRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "party".into(),
            id: id_str,
        })?;

        Ok(row.into_party(id)?)
    }
}
