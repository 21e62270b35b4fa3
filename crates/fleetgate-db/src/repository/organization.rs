//! SurrealDB implementation of [`OrganizationRepository`].

use chrono::{DateTime, Utc};
use fleetgate_core::error::FleetgateResult;
use fleetgate_core::models::organization::{
    CreateOrganization, Organization, UpdateOrganization,
};
use fleetgate_core::repository::{OrganizationRepository, PaginatedResult, Pagination};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct OrganizationRow {
    party_id: String,
    name: String,
    dot_number: Option<String>,
    mc_number: Option<String>,
    address: Option<String>,
    city: Option<String>,
    state: Option<String>,
    zip: Option<String>,
    phone: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct ClaimedPartyRow {
    #[allow(dead_code)]
    external_user_id: Option<String>,
}

#[derive(Debug, SurrealValue)]
struct OrganizationRowWithId {
    record_id: String,
    party_id: String,
    name: String,
    dot_number: Option<String>,
    mc_number: Option<String>,
    address: Option<String>,
    city: Option<String>,
    state: Option<String>,
    zip: Option<String>,
    phone: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrganizationRow {
    fn into_organization(self, id: Uuid) -> Result<Organization, DbError> {
        Ok(Organization {
            id,
            party_id: parse_uuid("party", &self.party_id)?,
            name: self.name,
            dot_number: self.dot_number,
            mc_number: self.mc_number,
            address: self.address,
            city: self.city,
            state: self.state,
            zip: self.zip,
            phone: self.phone,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl OrganizationRowWithId {
    fn try_into_organization(self) -> Result<Organization, DbError> {
        let id = parse_uuid("organization", &self.record_id)?;
        Ok(Organization {
            id,
            party_id: parse_uuid("party", &self.party_id)?,
            name: self.name,
            dot_number: self.dot_number,
            mc_number: self.mc_number,
            address: self.address,
            city: self.city,
            state: self.state,
            zip: self.zip,
            phone: self.phone,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Organization repository.
#[derive(Clone)]
pub struct SurrealOrganizationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealOrganizationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> OrganizationRepository for SurrealOrganizationRepository<C> {
    async fn create(&self, input: CreateOrganization) -> FleetgateResult<Organization> {
        let id = Uuid::new_v4();
        let party_id = Uuid::new_v4();

        // Anchor party and organization are created atomically; a
        // reader never sees one without the other.
        let result = self
            .db
            .query(
                "BEGIN TRANSACTION; \
                 CREATE type::record('party', $party_id) SET \
                 external_user_id = $external_user_id, status = 'Active'; \
                 CREATE type::record('organization', $id) SET \
                 party_id = $party_id, name = $name, \
                 dot_number = $dot_number, mc_number = $mc_number, \
                 address = $address, city = $city, state = $state, \
                 zip = $zip, phone = $phone; \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id.to_string()))
            .bind(("party_id", party_id.to_string()))
            .bind(("external_user_id", input.external_user_id))
            .bind(("name", input.name))
            .bind(("dot_number", input.dot_number))
            .bind(("mc_number", input.mc_number))
            .bind(("address", input.address))
            .bind(("city", input.city))
            .bind(("state", input.state))
            .bind(("zip", input.zip))
            .bind(("phone", input.phone))
            .await
            .map_err(DbError::from)?;

        result.check().map_err(DbError::from)?;

        self.get_by_id(id).await
    }

    async fn get_by_id(&self, id: Uuid) -> FleetgateResult<Organization> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('organization', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrganizationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "organization".into(),
            id: id_str,
        })?;

        Ok(row.into_organization(id)?)
    }

    async fn find_owned_by_principal(
        &self,
        external_user_id: &str,
    ) -> FleetgateResult<Option<Organization>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM organization \
                 WHERE party_id IN (\
                     SELECT VALUE meta::id(id) FROM party \
                     WHERE external_user_id = $external_user_id\
                 )",
            )
            .bind(("external_user_id", external_user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrganizationRowWithId> = result.take(0).map_err(DbError::from)?;

        rows.into_iter()
            .next()
            .map(|row| row.try_into_organization().map_err(Into::into))
            .transpose()
    }

    async fn claim(&self, id: Uuid, external_user_id: &str) -> FleetgateResult<Organization> {
        let organization = self.get_by_id(id).await?;

        // Bind the anchor party to the principal, but only if the
        // organization is still unclaimed.
        let result = self
            .db
            .query(
                "UPDATE type::record('party', $party_id) SET \
                 external_user_id = $external_user_id, \
                 updated_at = time::now() \
                 WHERE external_user_id = NONE",
            )
            .bind(("party_id", organization.party_id.to_string()))
            .bind(("external_user_id", external_user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<ClaimedPartyRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::Conflict {
                entity: "organization claim".into(),
            }
            .into());
        }

        Ok(organization)
    }

    async fn update(&self, id: Uuid, input: UpdateOrganization) -> FleetgateResult<Organization> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.name.is_some() {
            sets.push("name = $name");
        }
        if input.dot_number.is_some() {
            sets.push("dot_number = $dot_number");
        }
        if input.mc_number.is_some() {
            sets.push("mc_number = $mc_number");
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
        if input.phone.is_some() {
            sets.push("phone = $phone");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('organization', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(name) = input.name {
            builder = builder.bind(("name", name));
        }
        if let Some(dot_number) = input.dot_number {
            builder = builder.bind(("dot_number", dot_number));
        }
        if let Some(mc_number) = input.mc_number {
            builder = builder.bind(("mc_number", mc_number));
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
        if let Some(phone) = input.phone {
            builder = builder.bind(("phone", phone));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<OrganizationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "organization".into(),
            id: id_str,
        })?;

        Ok(row.into_organization(id)?)
    }

    async fn list(&self, pagination: Pagination) -> FleetgateResult<PaginatedResult<Organization>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM organization GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM organization \
                 ORDER BY name ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrganizationRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_organization())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
