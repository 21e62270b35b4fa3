//! SurrealDB implementation of [`ConsultantRepository`].

use chrono::{DateTime, Utc};
use fleetgate_core::error::FleetgateResult;
use fleetgate_core::models::consultant::{Consultant, CreateConsultant};
use fleetgate_core::repository::ConsultantRepository;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::parse_uuid;
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct ConsultantRow {
    party_id: String,
    name: String,
    company: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct ConsultantRowWithId {
    record_id: String,
    party_id: String,
    name: String,
    company: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ConsultantRow {
    fn into_consultant(self, id: Uuid) -> Result<Consultant, DbError> {
        Ok(Consultant {
            id,
            party_id: parse_uuid("party", &self.party_id)?,
            name: self.name,
            company: self.company,
            email: self.email,
            phone: self.phone,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl ConsultantRowWithId {
    fn try_into_consultant(self) -> Result<Consultant, DbError> {
        let id = parse_uuid("consultant", &self.record_id)?;
        ConsultantRow {
            party_id: self.party_id,
            name: self.name,
            company: self.company,
            email: self.email,
            phone: self.phone,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
        .into_consultant(id)
    }
}

/// SurrealDB implementation of the Consultant repository.
#[derive(Clone)]
pub struct SurrealConsultantRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealConsultantRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ConsultantRepository for SurrealConsultantRepository<C> {
    async fn create(&self, input: CreateConsultant) -> FleetgateResult<Consultant> {
        // One consultant-party per subject.
        let mut existing = self
            .db
            .query(
                "SELECT VALUE party_id FROM consultant WHERE party_id IN (\
                     SELECT VALUE meta::id(id) FROM party \
                     WHERE external_user_id = $external_user_id\
                 )",
            )
            .bind(("external_user_id", input.external_user_id.clone()))
            .await
            .map_err(DbError::from)?;
        let matches: Vec<String> = existing.take(0).map_err(DbError::from)?;
        if !matches.is_empty() {
            return Err(DbError::Conflict {
                entity: "consultant".into(),
            }
            .into());
        }

        let id = Uuid::new_v4();
        let party_id = Uuid::new_v4();

        let result = self
            .db
            .query(
                "BEGIN TRANSACTION; \
                 CREATE type::record('party', $party_id) SET \
                 external_user_id = $external_user_id, status = 'Active'; \
                 CREATE type::record('consultant', $id) SET \
                 party_id = $party_id, name = $name, \
                 company = $company, email = $email, phone = $phone; \
                 COMMIT TRANSACTION;",
            )
            .bind(("id", id.to_string()))
            .bind(("party_id", party_id.to_string()))
            .bind(("external_user_id", input.external_user_id))
            .bind(("name", input.name))
            .bind(("company", input.company))
            .bind(("email", input.email))
            .bind(("phone", input.phone))
            .await
            .map_err(DbError::from)?;

        result.check().map_err(DbError::from)?;

        self.get_by_id(id).await
    }

    async fn get_by_id(&self, id: Uuid) -> FleetgateResult<Consultant> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('consultant', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ConsultantRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "consultant".into(),
            id: id_str,
        })?;

        Ok(row.into_consultant(id)?)
    }

    async fn find_by_principal(
        &self,
        external_user_id: &str,
    ) -> FleetgateResult<Option<Consultant>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM consultant \
                 WHERE party_id IN (\
                     SELECT VALUE meta::id(id) FROM party \
                     WHERE external_user_id = $external_user_id\
                 )",
            )
            .bind(("external_user_id", external_user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ConsultantRowWithId> = result.take(0).map_err(DbError::from)?;

        rows.into_iter()
            .next()
            .map(|row| row.try_into_consultant().map_err(Into::into))
            .transpose()
    }
}
