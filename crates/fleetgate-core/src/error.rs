//! Error types for the Fleetgate system.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FleetgateError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Not authenticated")]
    Unauthenticated,

    #[error("Access denied: {reason}")]
    AccessDenied { reason: String },

    #[error("Data integrity violation: {detail}")]
    Integrity { detail: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type FleetgateResult<T> = Result<T, FleetgateError>;
