//! Fleetgate Authz — principal scope resolution, access decisions, and
//! organization hierarchy materialization.
//!
//! This is the single policy layer the back office calls instead of
//! re-deriving access rules per route: resolve the caller's [`Scope`]
//! once per request, ask [`authorize`] about the specific operation, and
//! expand an [`OrganizationCohort`] when a listing needs to be scoped to
//! an organization's members. The crate is generic over the repository
//! traits in `fleetgate-core` and has no storage dependency of its own.

pub mod decision;
pub mod error;
pub mod hierarchy;
pub mod identity;
pub mod report;
pub mod scope;
pub mod service;

pub use decision::{AccessBasis, Action, Decision, DenyReason, Operation, ResourceKind, authorize};
pub use error::AuthzError;
pub use hierarchy::{OrganizationCohort, expand_organization};
pub use identity::{IdentityResolver, PrincipalId, StaticIdentity};
pub use report::{IntegrityContext, IntegrityReporter, TracingReporter};
pub use scope::{OrgGrant, Scope, resolve_scope};
pub use service::AuthzService;
