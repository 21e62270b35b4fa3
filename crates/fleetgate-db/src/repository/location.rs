//! SurrealDB implementation of [`LocationRepository`].

use chrono::{DateTime, Utc};
use fleetgate_core::error::FleetgateResult;
use fleetgate_core::models::location::{CreateLocation, Location, UpdateLocation};
use fleetgate_core::repository::{LocationRepository, PaginatedResult, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct LocationRow {
    organization_id: String,
    name: String,
    address: Option<String>,
    city: Option<String>,
    state: Option<String>,
    zip: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct LocationRowWithId {
    record_id: String,
    organization_id: String,
    name: String,
    address: Option<String>,
    city: Option<String>,
    state: Option<String>,
    zip: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl LocationRow {
    fn into_location(self, id: Uuid) -> Result<Location, DbError> {
        Ok(Location {
            id,
            organization_id: parse_uuid("organization", &self.organization_id)?,
            name: self.name,
            address: self.address,
            city: self.city,
            state: self.state,
            zip: self.zip,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl LocationRowWithId {
    fn try_into_location(self) -> Result<Location, DbError> {
        let id = parse_uuid("location", &self.record_id)?;
        LocationRow {
            organization_id: self.organization_id,
            name: self.name,
            address: self.address,
            city: self.city,
            state: self.state,
            zip: self.zip,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_location(id)
    }
}

/// SurrealDB implementation of the Location repository.
#[derive(Clone)]
pub struct SurrealLocationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealLocationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> LocationRepository for SurrealLocationRepository<C> {
    async fn create(&self, input: CreateLocation) -> FleetgateResult<Location> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('location', $id) SET \
                 organization_id = $organization_id, name = $name, \
                 address = $address, city = $city, state = $state, \
                 zip = $zip",
            )
            .bind(("id", id_str.clone()))
            .bind(("organization_id", input.organization_id.to_string()))
            .bind(("name", input.name))
            .bind(("address", input.address))
            .bind(("city", input.city))
            .bind(("state", input.state))
            .bind(("zip", input.zip))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<LocationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "location".into(),
            id: id_str,
        })?;

        Ok(row.into_location(id)?)
    }

    async fn get_by_id(&self, organization_id: Uuid, id: Uuid) -> FleetgateResult<Location> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('location', $id) \
                 WHERE organization_id = $organization_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("organization_id", organization_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<LocationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "location".into(),
            id: id_str,
        })?;

        Ok(row.into_location(id)?)
    }

    async fn update(
        &self,
        organization_id: Uuid,
        id: Uuid,
        input: UpdateLocation,
    ) -> FleetgateResult<Location> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.address.is_some() {
            sets.push("address = $address");
        }
        if input.city.is_some() {
            sets.push("city = $city");
        }
        if input.state.is_some() {
            sets.push("state = $state");
        }
        if input.zip.is_some() {
            sets.push("zip = $zip");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('location', $id) SET {} \
             WHERE organization_id = $organization_id",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("organization_id", organization_id.to_string()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(address) = input.address {
            builder = builder.bind(("address", address));
        }
        if let Some(city) = input.city {
            builder = builder.bind(("city", city));
        }
        if let Some(state) = input.state {
            builder = builder.bind(("state", state));
        }
        if let Some(zip) = input.zip {
            builder = builder.bind(("zip", zip));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<LocationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "location".into(),
            id: id_str,
        })?;

        Ok(row.into_location(id)?)
    }

    async fn list_by_organization(
        &self,
        organization_id: Uuid,
        pagination: Pagination,
    ) -> FleetgateResult<PaginatedResult<Location>> {
        let organization_id_str = organization_id.to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM location \
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
                "SELECT meta::id(id) AS record_id, * FROM location \
                 WHERE organization_id = $organization_id \
                 ORDER BY name ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("organization_id", organization_id_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<LocationRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_location())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
