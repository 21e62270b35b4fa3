//! Organization hierarchy materialization.
//!
//! Listing queries ("all roadside inspections for organization X") are
//! scoped by expanding the organization into the concrete set of party
//! ids that belong to it, instead of every downstream query re-deriving
//! the join.

use std::collections::BTreeSet;

use fleetgate_core::error::FleetgateResult;
use fleetgate_core::models::party::PartyKind;
use fleetgate_core::repository::{OrganizationRepository, RoleRepository};
use uuid::Uuid;

/// The transitive set of party ids belonging to one organization: its
/// own anchor party plus every person- and equipment-party with an
/// effective role targeting it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrganizationCohort {
    pub organization_id: Uuid,
    pub party_ids: BTreeSet<Uuid>,
}

impl OrganizationCohort {
    pub fn contains(&self, party_id: Uuid) -> bool {
        self.party_ids.contains(&party_id)
    }

    /// Party ids in slice form, for repository `list_by_parties` calls.
    pub fn to_vec(&self) -> Vec<Uuid> {
        self.party_ids.iter().copied().collect()
    }
}

/// Expands an organization into its member party set.
///
/// Computed fresh per call — role grants change between requests, and
/// there is no cache to invalidate. The result always contains the
/// organization's own party id, so an organization with zero member
/// grants yields a singleton set: "no members", never "no access".
/// Consultant grants confer access, not membership, and are excluded.
pub async fn expand_organization<R, O>(
    roles: &R,
    organizations: &O,
    organization_id: Uuid,
) -> FleetgateResult<OrganizationCohort>
where
    R: RoleRepository,
    O: OrganizationRepository,
{
    let organization = organizations.get_by_id(organization_id).await?;

    let mut party_ids = BTreeSet::new();
    party_ids.insert(organization.party_id);

    for target in roles.find_targets_by_organization(organization_id).await? {
        if matches!(target.party_kind, PartyKind::Person | PartyKind::Equipment) {
            party_ids.insert(target.party_id);
        }
    }

    Ok(OrganizationCohort {
        organization_id,
        party_ids,
    })
}
