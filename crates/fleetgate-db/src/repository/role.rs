//! SurrealDB implementation of [`RoleRepository`].
//!
//! Roles are explicit rows rather than graph edges: they carry
//! lifecycle dates and survive deactivation for audit history, so
//! deactivation is a flag-and-end-date write, never a DELETE.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use fleetgate_core::error::FleetgateResult;
use fleetgate_core::models::party::PartyKind;
use fleetgate_core::models::role::{CreateRole, Role, RoleKind, RoleTarget};
use fleetgate_core::repository::RoleRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{parse_opt_uuid, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct RoleRow {
    party_id: String,
    organization_id: Option<String>,
    location_id: Option<String>,
    kind: String,
    is_active: bool,
    status: String,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct RoleRowWithId {
    record_id: String,
    party_id: String,
    organization_id: Option<String>,
    location_id: Option<String>,
    kind: String,
    is_active: bool,
    status: String,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct TargetRow {
    party_id: String,
    kind: String,
    location_id: Option<String>,
}

pub(crate) fn parse_role_kind(s: &str) -> Result<RoleKind, DbError> {
    match s {
        "Master" => Ok(RoleKind::Master),
        "Admin" => Ok(RoleKind::Admin),
        "Organization" => Ok(RoleKind::Organization),
        "Manager" => Ok(RoleKind::Manager),
        "Staff" => Ok(RoleKind::Staff),
        "Consultant" => Ok(RoleKind::Consultant),
        "Location" => Ok(RoleKind::Location),
        other => Err(DbError::Decode(format!("unknown role kind: {other}"))),
    }
}

pub(crate) fn role_kind_to_string(kind: RoleKind) -> &'static str {
    match kind {
        RoleKind::Master => "Master",
        RoleKind::Admin => "Admin",
        RoleKind::Organization => "Organization",
        RoleKind::Manager => "Manager",
        RoleKind::Staff => "Staff",
        RoleKind::Consultant => "Consultant",
        RoleKind::Location => "Location",
    }
}

impl RoleRow {
    fn into_role(self, id: Uuid) -> Result<Role, DbError> {
        Ok(Role {
            id,
            party_id: parse_uuid("party", &self.party_id)?,
            organization_id: parse_opt_uuid("organization", self.organization_id)?,
            location_id: parse_opt_uuid("location", self.location_id)?,
            kind: parse_role_kind(&self.kind)?,
            is_active: self.is_active,
            status: self.status,
            start_date: self.start_date,
            end_date: self.end_date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl RoleRowWithId {
    fn try_into_role(self) -> Result<Role, DbError> {
        let id = parse_uuid("role", &self.record_id)?;
        Ok(Role {
            id,
            party_id: parse_uuid("party", &self.party_id)?,
            organization_id: parse_opt_uuid("organization", self.organization_id)?,
            location_id: parse_opt_uuid("location", self.location_id)?,
            kind: parse_role_kind(&self.kind)?,
            is_active: self.is_active,
            status: self.status,
            start_date: self.start_date,
            end_date: self.end_date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Role repository.
#[derive(Clone)]
pub struct SurrealRoleRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealRoleRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> RoleRepository for SurrealRoleRepository<C> {
    async fn create(&self, input: CreateRole) -> FleetgateResult<Role> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('role', $id) SET \
                 party_id = $party_id, \
                 organization_id = $organization_id, \
                 location_id = $location_id, \
                 kind = $kind, is_active = true, status = $status, \
                 start_date = $start_date, end_date = $end_date",
            )
            .bind(("id", id_str.clone()))
            .bind(("party_id", input.party_id.to_string()))
            .bind((
                "organization_id",
                input.organization_id.map(|o| o.to_string()),
            ))
            .bind(("location_id", input.location_id.map(|l| l.to_string())))
            .bind(("kind", role_kind_to_string(input.kind)))
            .bind(("status", input.status.unwrap_or_else(|| "Active".into())))
            .bind(("start_date", input.start_date))
            .bind(("end_date", input.end_date))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "role".into(),
            id: id_str,
        })?;

        Ok(row.into_role(id)?)
    }

    async fn find_active_by_party(&self, party_id: Uuid) -> FleetgateResult<Vec<Role>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM role \
                 WHERE party_id = $party_id AND is_active = true",
            )
            .bind(("party_id", party_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<RoleRowWithId> = result.take(0).map_err(DbError::from)?;

        let roles = rows
            .into_iter()
            .map(|row| row.try_into_role())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(roles)
    }

    async fn find_targets_by_organization(
        &self,
        organization_id: Uuid,
    ) -> FleetgateResult<Vec<RoleTarget>> {
        let mut result = self
            .db
            .query(
                "SELECT party_id, kind, location_id FROM role \
                 WHERE organization_id = $organization_id \
                 AND is_active = true",
            )
            .bind(("organization_id", organization_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<TargetRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        // Classify each grantee party by which kind-defining table owns
        // it. Parties with no sub-record (e.g. dedicated master logins)
        // are not members of anything and are skipped.
        let party_ids: Vec<String> = rows
            .iter()
            .map(|r| r.party_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut kinds_result = self
            .db
            .query(
                "SELECT VALUE party_id FROM person \
                 WHERE party_id IN $party_ids; \
                 SELECT VALUE party_id FROM equipment \
                 WHERE party_id IN $party_ids; \
                 SELECT VALUE party_id FROM consultant \
                 WHERE party_id IN $party_ids;",
            )
            .bind(("party_ids", party_ids))
            .await
            .map_err(DbError::from)?;

        let person_parties: BTreeSet<String> = kinds_result
            .take::<Vec<String>>(0)
            .map_err(DbError::from)?
            .into_iter()
            .collect();
        let equipment_parties: BTreeSet<String> = kinds_result
            .take::<Vec<String>>(1)
            .map_err(DbError::from)?
            .into_iter()
            .collect();
        let consultant_parties: BTreeSet<String> = kinds_result
            .take::<Vec<String>>(2)
            .map_err(DbError::from)?
            .into_iter()
            .collect();

        let mut targets = Vec::new();
        for row in rows {
            let party_kind = if person_parties.contains(&row.party_id) {
                PartyKind::Person
            } else if equipment_parties.contains(&row.party_id) {
                PartyKind::Equipment
            } else if consultant_parties.contains(&row.party_id) {
                PartyKind::Consultant
            } else {
                continue;
            };
            targets.push(RoleTarget {
                party_id: parse_uuid("party", &row.party_id)?,
                party_kind,
                role_kind: parse_role_kind(&row.kind)?,
                location_id: parse_opt_uuid("location", row.location_id)?,
            });
        }

        Ok(targets)
    }

    async fn deactivate(&self, id: Uuid) -> FleetgateResult<Role> {
        let id_str = id.to_string();

        // Flag and end date land in one statement so no reader can see
        // a half-applied revocation.
        let result = self
            .db
            .query(
                "UPDATE type::record('role', $id) SET \
                 is_active = false, status = 'Inactive', \
                 end_date = time::now(), updated_at = time::now()",
            )
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "role".into(),
            id: id_str,
        })?;

        Ok(row.into_role(id)?)
    }
}
