//! Organization-scoped compliance listings.
//!
//! The composition every list endpoint follows: authorize the caller's
//! scope for the view operation, expand the organization into its
//! member party set, then query issues by that set. An organization
//! with members but no matching records yields an empty page — that is
//! "no records", never "no access".

use fleetgate_authz::{AuthzService, Operation, ResourceKind, Scope};
use fleetgate_core::error::FleetgateResult;
use fleetgate_core::models::issue::{Issue, IssueKind};
use fleetgate_core::repository::{
    IssueRepository, OrganizationRepository, PaginatedResult, Pagination, PartyRepository,
    RoleRepository,
};
use uuid::Uuid;

fn resource_for(kind: IssueKind) -> ResourceKind {
    match kind {
        IssueKind::RoadsideInspection => ResourceKind::Inspection,
        IssueKind::Accident => ResourceKind::Accident,
        IssueKind::License => ResourceKind::License,
        IssueKind::Training => ResourceKind::Training,
        IssueKind::DrugAlcohol => ResourceKind::DrugAlcohol,
        IssueKind::Registration => ResourceKind::Registration,
    }
}

/// Compliance listing service.
///
/// Listings are organization-wide, so a location-restricted grant does
/// not reach them; such callers query their location's entities
/// directly instead.
pub struct ComplianceListing<P, R, O, I> {
    authz: AuthzService<P, R, O>,
    issues: I,
}

impl<P, R, O, I> ComplianceListing<P, R, O, I>
where
    P: PartyRepository,
    R: RoleRepository,
    O: OrganizationRepository,
    I: IssueRepository,
{
    pub fn new(authz: AuthzService<P, R, O>, issues: I) -> Self {
        Self { authz, issues }
    }

    /// All roadside inspections for an organization.
    pub async fn list_inspections(
        &self,
        scope: &Scope,
        organization_id: Uuid,
        pagination: Pagination,
    ) -> FleetgateResult<PaginatedResult<Issue>> {
        self.list_issues(scope, organization_id, IssueKind::RoadsideInspection, pagination)
            .await
    }

    /// All accidents for an organization.
    pub async fn list_accidents(
        &self,
        scope: &Scope,
        organization_id: Uuid,
        pagination: Pagination,
    ) -> FleetgateResult<PaginatedResult<Issue>> {
        self.list_issues(scope, organization_id, IssueKind::Accident, pagination)
            .await
    }

    /// All issues of one kind for an organization: authorize, expand
    /// the cohort, query by party set.
    pub async fn list_issues(
        &self,
        scope: &Scope,
        organization_id: Uuid,
        kind: IssueKind,
        pagination: Pagination,
    ) -> FleetgateResult<PaginatedResult<Issue>> {
        self.authz.check(
            scope,
            Operation::view(resource_for(kind)),
            organization_id,
            None,
        )?;

        let cohort = self.authz.expand_organization(organization_id).await?;

        self.issues
            .list_by_parties(&cohort.to_vec(), Some(kind), pagination)
            .await
    }
}
