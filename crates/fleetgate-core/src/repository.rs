//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. These are deliberately narrow
//! query shapes: policy code only ever issues the reads defined here,
//! never raw unrestricted queries. Entity repositories take an
//! `organization_id` parameter to enforce tenant isolation.

use uuid::Uuid;

use crate::error::FleetgateResult;
use crate::models::{
    caf::{CafStatus, CorrectiveActionForm, CreateCaf},
    consultant::{Consultant, CreateConsultant},
    equipment::{CreateEquipment, Equipment, UpdateEquipment},
    issue::{CreateIssue, Issue, IssueKind, IssueStatus},
    location::{CreateLocation, Location, UpdateLocation},
    organization::{CreateOrganization, Organization, UpdateOrganization},
    party::{Party, PartyKind, PartyStatus},
    person::{CreatePerson, Person, UpdatePerson},
    role::{CreateRole, Role, RoleTarget},
    violation::{CreateViolation, Violation},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Party graph (global scope)
// ---------------------------------------------------------------------------

pub trait PartyRepository: Send + Sync {
    /// Every party bound to the given identity-provider subject.
    ///
    /// Returns all matches, never "the first one" — duplicate parties
    /// per subject are a known anomaly and callers must union over them.
    fn find_by_principal(
        &self,
        external_user_id: &str,
    ) -> impl Future<Output = FleetgateResult<Vec<Party>>> + Send;

    fn get_by_id(&self, id: Uuid) -> impl Future<Output = FleetgateResult<Party>> + Send;

    /// Which kind-defining sub-record the party owns, if any.
    fn kind_of(
        &self,
        id: Uuid,
    ) -> impl Future<Output = FleetgateResult<Option<PartyKind>>> + Send;

    fn set_status(
        &self,
        id: Uuid,
        status: PartyStatus,
    ) -> impl Future<Output = FleetgateResult<Party>> + Send;
}

pub trait RoleRepository: Send + Sync {
    fn create(&self, input: CreateRole) -> impl Future<Output = FleetgateResult<Role>> + Send;

    /// Active roles held by a party. Date-window effectiveness is the
    /// caller's concern; this filters on the active flag only.
    fn find_active_by_party(
        &self,
        party_id: Uuid,
    ) -> impl Future<Output = FleetgateResult<Vec<Role>>> + Send;

    /// Grantee parties of active roles targeting an organization, with
    /// each party's kind. Used to materialize organization membership.
    fn find_targets_by_organization(
        &self,
        organization_id: Uuid,
    ) -> impl Future<Output = FleetgateResult<Vec<RoleTarget>>> + Send;

    /// Soft-delete: clears the active flag and stamps the end date in a
    /// single atomic write.
    fn deactivate(&self, id: Uuid) -> impl Future<Output = FleetgateResult<Role>> + Send;
}

pub trait OrganizationRepository: Send + Sync {
    /// Creates the organization and its anchor party atomically.
    fn create(
        &self,
        input: CreateOrganization,
    ) -> impl Future<Output = FleetgateResult<Organization>> + Send;

    fn get_by_id(&self, id: Uuid) -> impl Future<Output = FleetgateResult<Organization>> + Send;

    /// The organization whose anchor party is bound to the given
    /// subject, if any — the direct-ownership master signal.
    fn find_owned_by_principal(
        &self,
        external_user_id: &str,
    ) -> impl Future<Output = FleetgateResult<Option<Organization>>> + Send;

    /// Binds the organization's anchor party to a principal. Fails with
    /// `AlreadyExists` if the organization is already claimed.
    fn claim(
        &self,
        id: Uuid,
        external_user_id: &str,
    ) -> impl Future<Output = FleetgateResult<Organization>> + Send;

    fn update(
        &self,
        id: Uuid,
        input: UpdateOrganization,
    ) -> impl Future<Output = FleetgateResult<Organization>> + Send;

    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = FleetgateResult<PaginatedResult<Organization>>> + Send;
}

// ---------------------------------------------------------------------------
// Organization-scoped entities
// ---------------------------------------------------------------------------

pub trait PersonRepository: Send + Sync {
    /// Creates the person, their anchor party, and their membership role
    /// in one transaction. Rejects a second person-party for a subject
    /// that already has one.
    fn create(&self, input: CreatePerson) -> impl Future<Output = FleetgateResult<Person>> + Send;

    fn get_by_id(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = FleetgateResult<Person>> + Send;

    fn update(
        &self,
        organization_id: Uuid,
        id: Uuid,
        input: UpdatePerson,
    ) -> impl Future<Output = FleetgateResult<Person>> + Send;

    fn list_by_organization(
        &self,
        organization_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = FleetgateResult<PaginatedResult<Person>>> + Send;
}

pub trait EquipmentRepository: Send + Sync {
    /// Creates the unit, its anchor party, and its membership role in
    /// one transaction.
    fn create(
        &self,
        input: CreateEquipment,
    ) -> impl Future<Output = FleetgateResult<Equipment>> + Send;

    fn get_by_id(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = FleetgateResult<Equipment>> + Send;

    fn update(
        &self,
        organization_id: Uuid,
        id: Uuid,
        input: UpdateEquipment,
    ) -> impl Future<Output = FleetgateResult<Equipment>> + Send;

    fn list_by_organization(
        &self,
        organization_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = FleetgateResult<PaginatedResult<Equipment>>> + Send;
}

pub trait ConsultantRepository: Send + Sync {
    /// Creates the consultant and their anchor party in one transaction.
    /// Rejects a second consultant-party for a subject that already has
    /// one.
    fn create(
        &self,
        input: CreateConsultant,
    ) -> impl Future<Output = FleetgateResult<Consultant>> + Send;

    fn get_by_id(&self, id: Uuid) -> impl Future<Output = FleetgateResult<Consultant>> + Send;

    fn find_by_principal(
        &self,
        external_user_id: &str,
    ) -> impl Future<Output = FleetgateResult<Option<Consultant>>> + Send;
}

pub trait LocationRepository: Send + Sync {
    fn create(
        &self,
        input: CreateLocation,
    ) -> impl Future<Output = FleetgateResult<Location>> + Send;

    fn get_by_id(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = FleetgateResult<Location>> + Send;

    fn update(
        &self,
        organization_id: Uuid,
        id: Uuid,
        input: UpdateLocation,
    ) -> impl Future<Output = FleetgateResult<Location>> + Send;

    fn list_by_organization(
        &self,
        organization_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = FleetgateResult<PaginatedResult<Location>>> + Send;
}

// ---------------------------------------------------------------------------
// Compliance records
// ---------------------------------------------------------------------------

pub trait IssueRepository: Send + Sync {
    fn create(&self, input: CreateIssue) -> impl Future<Output = FleetgateResult<Issue>> + Send;

    fn get_by_id(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = FleetgateResult<Issue>> + Send;

    fn set_status(
        &self,
        organization_id: Uuid,
        id: Uuid,
        status: IssueStatus,
    ) -> impl Future<Output = FleetgateResult<Issue>> + Send;

    /// Issues whose subject party is in the given set — the query shape
    /// behind organization-scoped listings. An empty page means "no
    /// records", never "no access".
    fn list_by_parties(
        &self,
        party_ids: &[Uuid],
        kind: Option<IssueKind>,
        pagination: Pagination,
    ) -> impl Future<Output = FleetgateResult<PaginatedResult<Issue>>> + Send;
}

pub trait ViolationRepository: Send + Sync {
    fn create(
        &self,
        input: CreateViolation,
    ) -> impl Future<Output = FleetgateResult<Violation>> + Send;

    fn list_by_issue(
        &self,
        issue_id: Uuid,
    ) -> impl Future<Output = FleetgateResult<Vec<Violation>>> + Send;
}

pub trait CafRepository: Send + Sync {
    fn create(
        &self,
        input: CreateCaf,
    ) -> impl Future<Output = FleetgateResult<CorrectiveActionForm>> + Send;

    fn get_by_id(
        &self,
        organization_id: Uuid,
        id: Uuid,
    ) -> impl Future<Output = FleetgateResult<CorrectiveActionForm>> + Send;

    fn set_status(
        &self,
        organization_id: Uuid,
        id: Uuid,
        status: CafStatus,
    ) -> impl Future<Output = FleetgateResult<CorrectiveActionForm>> + Send;

    fn list_by_organization(
        &self,
        organization_id: Uuid,
        pagination: Pagination,
    ) -> impl Future<Output = FleetgateResult<PaginatedResult<CorrectiveActionForm>>> + Send;

    /// Whether any existing form already covers the given violation.
    /// Used by generation to stay idempotent.
    fn find_covering_violation(
        &self,
        violation_id: Uuid,
    ) -> impl Future<Output = FleetgateResult<Option<CorrectiveActionForm>>> + Send;
}
