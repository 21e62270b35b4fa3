//! Database-specific error types and conversions.

use fleetgate_core::error::FleetgateError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Row decode failed: {0}")]
    Decode(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Record already exists: {entity}")]
    Conflict { entity: String },
}

impl From<DbError> for FleetgateError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => FleetgateError::NotFound { entity, id },
            DbError::Conflict { entity } => FleetgateError::AlreadyExists { entity },
            other => FleetgateError::Database(other.to_string()),
        }
    }
}
