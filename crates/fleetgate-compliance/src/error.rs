//! Compliance service error types.

use fleetgate_core::error::FleetgateError;
use fleetgate_core::models::issue::IssueKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ComplianceError {
    #[error("issue is a {actual:?}, expected {expected:?}")]
    WrongIssueKind {
        expected: IssueKind,
        actual: IssueKind,
    },
}

impl From<ComplianceError> for FleetgateError {
    fn from(err: ComplianceError) -> Self {
        FleetgateError::Validation {
            message: err.to_string(),
        }
    }
}
