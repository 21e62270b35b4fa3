//! SurrealDB implementation of [`EquipmentRepository`].

use chrono::{DateTime, Utc};
use fleetgate_core::error::FleetgateResult;
use fleetgate_core::models::equipment::{CreateEquipment, Equipment, UpdateEquipment};
use fleetgate_core::repository::{EquipmentRepository, PaginatedResult, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, parse_opt_uuid, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct EquipmentRow {
    party_id: String,
    organization_id: String,
    location_id: Option<String>,
    unit_number: String,
    vin: Option<String>,
    license_plate: Option<String>,
    plate_state: Option<String>,
    year: Option<u16>,
    make: Option<String>,
    model: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct EquipmentRowWithId {
    record_id: String,
    party_id: String,
    organization_id: String,
    location_id: Option<String>,
    unit_number: String,
    vin: Option<String>,
    license_plate: Option<String>,
    plate_state: Option<String>,
    year: Option<u16>,
    make: Option<String>,
    model: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl EquipmentRow {
    fn into_equipment(self, id: Uuid) -> Result<Equipment, DbError> {
        Ok(Equipment {
            id,
            party_id: parse_uuid("party", &self.party_id)?,
            organization_id: parse_uuid("organization", &self.organization_id)?,
            location_id: parse_opt_uuid("location", self.location_id)?,
            unit_number: self.unit_number,
            vin: self.vin,
            license_plate: self.license_plate,
            plate_state: self.plate_state,
            year: self.year,
            make: self.make,
            model: self.model,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl EquipmentRowWithId {
    fn try_into_equipment(self) -> Result<Equipment, DbError> {
        let id = parse_uuid("equipment", &self.record_id)?;
        EquipmentRow {
            party_id: self.party_id,
            organization_id: self.organization_id,
            location_id: self.location_id,
            unit_number: self.unit_number,
            vin: self.vin,
            license_plate: self.license_plate,
            plate_state: self.plate_state,
            year: self.year,
            make: self.make,
            model: self.model,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_equipment(id)
    }
}

/// SurrealDB implementation of the Equipment repository.
#[derive(Clone)]
pub struct SurrealEquipmentRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealEquipmentRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn fetch(&self, id: Uuid) -> Result<Equipment, DbError> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('equipment', $id)")
            .bind(("id", id_str.clone()))
            .await?;

        let rows: Vec<EquipmentRow> = result.take(0)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "equipment".into(),
            id: id_str,
        })?;

        row.into_equipment(id)
    }
}

impl<C: Connection> EquipmentRepository for SurrealEquipmentRepository<C> {
    async fn create(&self, input: CreateEquipment) -> FleetgateResult<Equipment> {
        let id = Uuid::new_v4();
        let party_id = Uuid::new_v4();
        let role_id = Uuid::new_v4();

        // Party, unit, and membership role land in one transaction, the
        // same shape as person onboarding.
        let result = self
            .db
            .query(
                "BEGIN TRANSACTION; \
                 CREATE type::record('party', $party_id) SET \
                 external_user_id = NONE, status = 'Active'; \
                 CREATE type::record('equipment', $id) SET \
                 party_id = $party_id, \
                 organization_id = $organization_id, \
                 location_id = $location_id, \
                 unit_number = $unit_number, vin = $vin, \
                 license_plate = $license_plate, \
                 plate_state = $plate_state, \
                 year = $year, make = $make, model = $model; \
                 CREATE type::record('role', $role_id) SET \
                 party_id = $party_id, \
                 organization_id = $organization_id, \
                 location_id = $location_id, \
                 kind = 'Staff', is_active = true, status = 'Active'; \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id.to_string()))
            .bind(("party_id", party_id.to_string()))
            .bind(("role_id", role_id.to_string()))
            .bind(("organization_id", input.organization_id.to_string()))
            .bind(("location_id", input.location_id.map(|l| l.to_string())))
            .bind(("unit_number", input.unit_number))
            .bind(("vin", input.vin))
            .bind(("license_plate", input.license_plate))
            .bind(("plate_state", input.plate_state))
            .bind(("year", input.year))
            .bind(("make", input.make))
            .bind(("model", input.model))
            .await
            .map_err(DbError::from)?;

        result.check().map_err(DbError::from)?;

        Ok(self.fetch(id).await?)
    }

    async fn get_by_id(&self, organization_id: Uuid, id: Uuid) -> FleetgateResult<Equipment> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('equipment', $id) \
                 WHERE organization_id = $organization_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("organization_id", organization_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<EquipmentRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "equipment".into(),
            id: id_str,
        })?;

        Ok(row.into_equipment(id)?)
    }

    async fn update(
        &self,
        organization_id: Uuid,
        id: Uuid,
        input: UpdateEquipment,
    ) -> FleetgateResult<Equipment> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.location_id.is_some() {
            sets.push("location_id = $location_id");
        }
        if input.unit_number.is_some() {
            sets.push("unit_number = $unit_number");
        }
        if input.vin.is_some() {
            sets.push("vin = $vin");
        }
        if input.license_plate.is_some() {
            sets.push("license_plate = $license_plate");
        }
        if input.plate_state.is_some() {
            sets.push("plate_state = $plate_state");
        }
        if input.year.is_some() {
            sets.push("year = $year");
        }
        if input.make.is_some() {
            sets.push("make = $make");
        }
        if input.model.is_some() {
            sets.push("model = $model");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('equipment', $id) SET {} \
             WHERE organization_id = $organization_id",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("organization_id", organization_id.to_string()));

        if let Some(location_id) = input.location_id {
            builder = builder.bind(("location_id", location_id.map(|l| l.to_string())));
        }
        if let Some(unit_number) = input.unit_number {
            builder = builder.bind(("unit_number", unit_number));
        }
        if let Some(vin) = input.vin {
            builder = builder.bind(("vin", vin));
        }
        if let Some(license_plate) = input.license_plate {
            builder = builder.bind(("license_plate", license_plate));
        }
        if let Some(plate_state) = input.plate_state {
            builder = builder.bind(("plate_state", plate_state));
        }
        if let Some(year) = input.year {
            builder = builder.bind(("year", year));
        }
        if let Some(make) = input.make {
            builder = builder.bind(("make", make));
        }
        if let Some(model) = input.model {
            builder = builder.bind(("model", model));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<EquipmentRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "equipment".into(),
            id: id_str,
        })?;

        Ok(row.into_equipment(id)?)
    }

    async fn list_by_organization(
        &self,
        organization_id: Uuid,
        pagination: Pagination,
    ) -> FleetgateResult<PaginatedResult<Equipment>> {
        let organization_id_str = organization_id.to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM equipment \
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
                "SELECT meta::id(id) AS record_id, * FROM equipment \
                 WHERE organization_id = $organization_id \
                 ORDER BY unit_number ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("organization_id", organization_id_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<EquipmentRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_equipment())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
