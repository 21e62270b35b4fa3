//! Fleetgate Compliance — domain services the back office builds on the
//! authorization core: corrective-action-form generation from cited
//! violations, and organization-scoped compliance listings.

pub mod caf;
pub mod error;
pub mod listing;

pub use caf::CafService;
pub use error::ComplianceError;
pub use listing::ComplianceListing;
