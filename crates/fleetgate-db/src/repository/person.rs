//! SurrealDB implementation of [`PersonRepository`].

use chrono::{DateTime, Utc};
use fleetgate_core::error::FleetgateResult;
use fleetgate_core::models::person::{CreatePerson, Person, UpdatePerson};
use fleetgate_core::repository::{PaginatedResult, Pagination, PersonRepository};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::{CountRow, date_string, parse_opt_date, parse_opt_uuid, parse_uuid};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct PersonRow {
    party_id: String,
    organization_id: String,
    location_id: Option<String>,
    first_name: String,
    last_name: String,
    email: Option<String>,
    phone: Option<String>,
    date_of_birth: Option<String>,
    license_number: Option<String>,
    license_state: Option<String>,
    license_expiration: Option<String>,
    hire_date: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct PersonRowWithId {
    record_id: String,
    party_id: String,
    organization_id: String,
    location_id: Option<String>,
    first_name: String,
    last_name: String,
    email: Option<String>,
    phone: Option<String>,
    date_of_birth: Option<String>,
    license_number: Option<String>,
    license_state: Option<String>,
    license_expiration: Option<String>,
    hire_date: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PersonRow {
    fn into_person(self, id: Uuid) -> Result<Person, DbError> {
        Ok(Person {
            id,
            party_id: parse_uuid("party", &self.party_id)?,
            organization_id: parse_uuid("organization", &self.organization_id)?,
            location_id: parse_opt_uuid("location", self.location_id)?,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            date_of_birth: parse_opt_date("date_of_birth", self.date_of_birth)?,
            license_number: self.license_number,
            license_state: self.license_state,
            license_expiration: parse_opt_date("license_expiration", self.license_expiration)?,
            hire_date: parse_opt_date("hire_date", self.hire_date)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl PersonRowWithId {
    fn try_into_person(self) -> Result<Person, DbError> {
        let id = parse_uuid("person", &self.record_id)?;
        PersonRow {
            party_id: self.party_id,
            organization_id: self.organization_id,
            location_id: self.location_id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            date_of_birth: self.date_of_birth,
            license_number: self.license_number,
            license_state: self.license_state,
            license_expiration: self.license_expiration,
            hire_date: self.hire_date,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_person(id)
    }
}

/// SurrealDB implementation of the Person repository.
#[derive(Clone)]
pub struct SurrealPersonRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealPersonRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn fetch(&self, id: Uuid) -> Result<Person, DbError> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('person', $id)")
            .bind(("id", id_str.clone()))
            .await?;

        let rows: Vec<PersonRow> = result.take(0)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "person".into(),
            id: id_str,
        })?;

        row.into_person(id)
    }
}

impl<C: Connection> PersonRepository for SurrealPersonRepository<C> {
    async fn create(&self, input: CreatePerson) -> FleetgateResult<Person> {
        // A subject may anchor at most one person-party. Enforced here
        // at write time; readers still union over historical
        // duplicates.
        if let Some(subject) = &input.external_user_id {
            let mut existing = self
                .db
                .query(
                    "SELECT VALUE party_id FROM person WHERE party_id IN (\
                         SELECT VALUE meta::id(id) FROM party \
                         WHERE external_user_id = $external_user_id\
                     )",
                )
                .bind(("external_user_id", subject.clone()))
                .await
                .map_err(DbError::from)?;
            let matches: Vec<String> = existing.take(0).map_err(DbError::from)?;
            if !matches.is_empty() {
                return Err(DbError::Conflict {
                    entity: "person".into(),
                }
                .into());
            }
        }

        let id = Uuid::new_v4();
        let party_id = Uuid::new_v4();
        let role_id = Uuid::new_v4();

        // Party, person, and the membership role that makes the person
        // belong to the organization land in one transaction.
        let result = self
            .db
            .query(
                "BEGIN TRANSACTION; \
                 CREATE type::record('party', $party_id) SET \
                 external_user_id = $external_user_id, status = 'Active'; \
                 CREATE type::record('person', $id) SET \
                 party_id = $party_id, \
                 organization_id = $organization_id, \
                 location_id = $location_id, \
                 first_name = $first_name, last_name = $last_name, \
                 email = $email, phone = $phone, \
                 date_of_birth = $date_of_birth, \
                 license_number = $license_number, \
                 license_state = $license_state, \
                 license_expiration = $license_expiration, \
                 hire_date = $hire_date; \
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
            .bind(("external_user_id", input.external_user_id))
            .bind(("organization_id", input.organization_id.to_string()))
            .bind(("location_id", input.location_id.map(|l| l.to_string())))
            .bind(("first_name", input.first_name))
            .bind(("last_name", input.last_name))
            .bind(("email", input.email))
            .bind(("phone", input.phone))
            .bind(("date_of_birth", date_string(input.date_of_birth)))
            .bind(("license_number", input.license_number))
            .bind(("license_state", input.license_state))
            .bind(("license_expiration", date_string(input.license_expiration)))
            .bind(("hire_date", date_string(input.hire_date)))
            .await
            .map_err(DbError::from)?;

        result.check().map_err(DbError::from)?;

        Ok(self.fetch(id).await?)
    }

    async fn get_by_id(&self, organization_id: Uuid, id: Uuid) -> FleetgateResult<Person> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query(
                "SELECT * FROM type::record('person', $id) \
                 WHERE organization_id = $organization_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("organization_id", organization_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PersonRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "person".into(),
            id: id_str,
        })?;

        Ok(row.into_person(id)?)
    }

    async fn update(
        &self,
        organization_id: Uuid,
        id: Uuid,
        input: UpdatePerson,
    ) -> FleetgateResult<Person> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.location_id.is_some() {
            sets.push("location_id = $location_id");
        }
        if input.first_name.is_some() {
            sets.push("first_name = $first_name");
        }
        if input.last_name.is_some() {
            sets.push("last_name = $last_name");
        }
        if input.email.is_some() {
            sets.push("email = $email");
        }
        if input.phone.is_some() {
            sets.push("phone = $phone");
        }
        if input.license_number.is_some() {
            sets.push("license_number = $license_number");
        }
        if input.license_state.is_some() {
            sets.push("license_state = $license_state");
        }
        if input.license_expiration.is_some() {
            sets.push("license_expiration = $license_expiration");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('person', $id) SET {} \
             WHERE organization_id = $organization_id",
            sets.join(", ")
        );

        let mut builder = self
            .db
            .query(&query)
            .bind(("id", id_str.clone()))
            .bind(("organization_id", organization_id.to_string()));

        // `Some(None)` clears the location; `Some(Some(_))` reassigns.
        if let Some(location_id) = input.location_id {
            builder = builder.bind(("location_id", location_id.map(|l| l.to_string())));
        }
        if let Some(first_name) = input.first_name {
            builder = builder.bind(("first_name", first_name));
        }
        if let Some(last_name) = input.last_name {
            builder = builder.bind(("last_name", last_name));
        }
        if let Some(email) = input.email {
            builder = builder.bind(("email", email));
        }
        if let Some(phone) = input.phone {
            builder = builder.bind(("phone", phone));
        }
        if let Some(license_number) = input.license_number {
            builder = builder.bind(("license_number", license_number));
        }
        if let Some(license_state) = input.license_state {
            builder = builder.bind(("license_state", license_state));
        }
        if let Some(license_expiration) = input.license_expiration {
            builder = builder.bind((
                "license_expiration",
                date_string(Some(license_expiration)),
            ));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result.check().map_err(DbError::from)?;

        let rows: Vec<PersonRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "person".into(),
            id: id_str,
        })?;

        Ok(row.into_person(id)?)
    }

    async fn list_by_organization(
        &self,
        organization_id: Uuid,
        pagination: Pagination,
    ) -> FleetgateResult<PaginatedResult<Person>> {
        let organization_id_str = organization_id.to_string();

        let mut count_result = self
            .db
            .query(
                "SELECT count() AS total FROM person \
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
                "SELECT meta::id(id) AS record_id, * FROM person \
                 WHERE organization_id = $organization_id \
                 ORDER BY last_name ASC \
                 LIMIT $limit START $offset",
            )
            .bind(("organization_id", organization_id_str))
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PersonRowWithId> = result.take(0).map_err(DbError::from)?;

        let items = rows
            .into_iter()
            .map(|row| row.try_into_person())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
