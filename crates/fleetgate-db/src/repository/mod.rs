//! SurrealDB repository implementations.

mod caf;
mod consultant;
mod equipment;
mod issue;
mod location;
mod organization;
mod party;
mod person;
mod role;
mod violation;

pub use caf::SurrealCafRepository;
pub use consultant::SurrealConsultantRepository;
pub use equipment::SurrealEquipmentRepository;
pub use issue::SurrealIssueRepository;
pub use location::SurrealLocationRepository;
pub use organization::SurrealOrganizationRepository;
pub use party::SurrealPartyRepository;
pub use person::SurrealPersonRepository;
pub use role::SurrealRoleRepository;
pub use violation::SurrealViolationRepository;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::DbError;

/// Row struct for count queries.
#[derive(Debug, surrealdb_types::SurrealValue)]
pub(crate) struct CountRow {
    pub(crate) total: u64,
}

pub(crate) fn parse_uuid(field: &str, value: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(value).map_err(|e| DbError::Decode(format!("invalid {field} UUID: {e}")))
}

pub(crate) fn parse_opt_uuid(field: &str, value: Option<String>) -> Result<Option<Uuid>, DbError> {
    value.map(|v| parse_uuid(field, &v)).transpose()
}

/// Calendar dates are stored as `YYYY-MM-DD` strings.
pub(crate) fn parse_opt_date(
    field: &str,
    value: Option<String>,
) -> Result<Option<NaiveDate>, DbError> {
    value
        .map(|v| {
            NaiveDate::parse_from_str(&v, "%Y-%m-%d")
                .map_err(|e| DbError::Decode(format!("invalid {field} date: {e}")))
        })
        .transpose()
}

pub(crate) fn date_string(value: Option<NaiveDate>) -> Option<String> {
    value.map(|d| d.format("%Y-%m-%d").to_string())
}
