//! Authorization service — the facade request handlers call.
//!
//! Owns the three party-graph repositories and the integrity reporter,
//! and wires the resolver, decision engine, and hierarchy materializer
//! together. Generic over repository implementations so that policy has
//! no dependency on the database crate.

use std::sync::Arc;

use fleetgate_core::error::FleetgateResult;
use fleetgate_core::repository::{OrganizationRepository, PartyRepository, RoleRepository};
use uuid::Uuid;

use crate::decision::{self, AccessBasis, Decision, Operation};
use crate::error::AuthzError;
use crate::hierarchy::{self, OrganizationCohort};
use crate::identity::{IdentityResolver, PrincipalId};
use crate::report::IntegrityReporter;
use crate::scope::{self, Scope};

pub struct AuthzService<P, R, O> {
    parties: P,
    roles: R,
    organizations: O,
    reporter: Arc<dyn IntegrityReporter>,
}

impl<P, R, O> AuthzService<P, R, O>
where
    P: PartyRepository,
    R: RoleRepository,
    O: OrganizationRepository,
{
    pub fn new(parties: P, roles: R, organizations: O, reporter: Arc<dyn IntegrityReporter>) -> Self {
        Self {
            parties,
            roles,
            organizations,
            reporter,
        }
    }

    /// Resolves the scope of a known principal. Always recomputed; a
    /// scope must not be trusted across requests.
    pub async fn resolve_scope(&self, principal: &PrincipalId) -> FleetgateResult<Scope> {
        scope::resolve_scope(
            &self.parties,
            &self.roles,
            &self.organizations,
            self.reporter.as_ref(),
            principal,
        )
        .await
    }

    /// Resolves the scope of the calling principal, or fails with
    /// `Unauthenticated` when the request carries none.
    pub async fn resolve_current<I>(&self, identity: &I) -> FleetgateResult<Scope>
    where
        I: IdentityResolver,
    {
        let principal = identity
            .current_principal()
            .ok_or(AuthzError::Unauthenticated)?;
        self.resolve_scope(&principal).await
    }

    /// Pure decision over an already-resolved scope.
    pub fn authorize(
        &self,
        scope: &Scope,
        operation: Operation,
        target_organization_id: Uuid,
        target_location_id: Option<Uuid>,
    ) -> Decision {
        decision::authorize(scope, operation, target_organization_id, target_location_id)
    }

    /// [`authorize`](Self::authorize), surfaced as a `Result` so request
    /// handlers can `?` on denial.
    pub fn check(
        &self,
        scope: &Scope,
        operation: Operation,
        target_organization_id: Uuid,
        target_location_id: Option<Uuid>,
    ) -> FleetgateResult<AccessBasis> {
        self.authorize(scope, operation, target_organization_id, target_location_id)
            .require(operation, target_organization_id)
            .map_err(Into::into)
    }

    /// Expands an organization into its member party set for scoped
    /// listing queries.
    pub async fn expand_organization(
        &self,
        organization_id: Uuid,
    ) -> FleetgateResult<OrganizationCohort> {
        hierarchy::expand_organization(&self.roles, &self.organizations, organization_id).await
    }
}
