//! Authorization error types.

use fleetgate_core::error::FleetgateError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AuthzError {
    #[error("not authenticated")]
    Unauthenticated,

    #[error("no grant covers organization {organization_id}")]
    NotInScope { organization_id: Uuid },

    #[error("role kind does not permit {operation} on organization {organization_id}")]
    InvalidOperation {
        operation: String,
        organization_id: Uuid,
    },

    #[error("grant references missing organization {organization_id}")]
    Integrity { organization_id: Uuid },
}

impl From<AuthzError> for FleetgateError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::Unauthenticated => FleetgateError::Unauthenticated,
            AuthzError::NotInScope { .. } | AuthzError::InvalidOperation { .. } => {
                FleetgateError::AccessDenied {
                    reason: err.to_string(),
                }
            }
            AuthzError::Integrity { .. } => FleetgateError::Integrity {
                detail: err.to_string(),
            },
        }
    }
}
