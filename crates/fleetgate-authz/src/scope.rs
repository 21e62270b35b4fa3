//! Role/scope resolution.
//!
//! A [`Scope`] is the full answer to "what may this principal act on,
//! and at what privilege" — computed fresh per request, never cached
//! across requests, so a role deactivated by a concurrent request is
//! reflected on the next resolution.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Utc;
use fleetgate_core::error::{FleetgateError, FleetgateResult};
use fleetgate_core::models::role::RoleKind;
use fleetgate_core::repository::{OrganizationRepository, PartyRepository, RoleRepository};
use uuid::Uuid;

use crate::identity::PrincipalId;
use crate::report::{IntegrityContext, IntegrityReporter};

/// The strongest effective grant a principal holds on one organization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrgGrant {
    pub kind: RoleKind,
    /// Set when the grant is restricted to a single location's entities.
    pub location_id: Option<Uuid>,
}

/// Everything a principal may act on, and at what privilege level.
#[derive(Debug, Clone, PartialEq)]
pub struct Scope {
    pub principal: PrincipalId,
    /// True when the principal holds an effective master-kind role, or
    /// directly owns an organization. Two historically distinct grant
    /// mechanisms; both are honored.
    pub is_master: bool,
    /// The organization whose anchor party is bound to this principal,
    /// if any.
    pub owned_organization_id: Option<Uuid>,
    /// Strongest effective grant per organization.
    pub grants: BTreeMap<Uuid, OrgGrant>,
    /// Organizations referenced by effective roles but missing from the
    /// store. Access through these is denied as an integrity violation
    /// rather than granted or crashed on.
    pub broken_grants: BTreeSet<Uuid>,
}

impl Scope {
    pub fn granted_organization_ids(&self) -> BTreeSet<Uuid> {
        self.grants.keys().copied().collect()
    }

    pub fn grant_for(&self, organization_id: Uuid) -> Option<&OrgGrant> {
        self.grants.get(&organization_id)
    }

    pub fn role_kind_for(&self, organization_id: Uuid) -> Option<RoleKind> {
        self.grants.get(&organization_id).map(|g| g.kind)
    }

    /// A principal with no party and no roles resolves to an empty
    /// scope; callers decide whether that means onboarding is required.
    pub fn is_empty(&self) -> bool {
        !self.is_master && self.owned_organization_id.is_none() && self.grants.is_empty()
    }
}

/// Replaces `current` when `candidate` is the stronger grant. Higher
/// privilege rank wins; at equal rank an unrestricted grant beats a
/// location-restricted one.
fn stronger(current: OrgGrant, candidate: OrgGrant) -> OrgGrant {
    let (cur, cand) = (
        current.kind.privilege_rank(),
        candidate.kind.privilege_rank(),
    );
    if cand > cur {
        candidate
    } else if cand == cur && current.location_id.is_some() && candidate.location_id.is_none() {
        candidate
    } else {
        current
    }
}

/// Resolves the set of organizations the principal may act on, and at
/// what privilege level.
///
/// Unions roles across *all* parties bound to the principal — duplicate
/// party rows per subject are a known anomaly, and silently picking one
/// of them is the bug class this function exists to eliminate. A
/// principal with no party and no roles resolves to an empty, non-master
/// scope, not an error.
pub async fn resolve_scope<P, R, O>(
    parties: &P,
    roles: &R,
    organizations: &O,
    reporter: &dyn IntegrityReporter,
    principal: &PrincipalId,
) -> FleetgateResult<Scope>
where
    P: PartyRepository,
    R: RoleRepository,
    O: OrganizationRepository,
{
    // 1. Every party bound to the principal, duplicates included.
    let party_rows = parties.find_by_principal(principal.as_str()).await?;

    // 2. Direct organization ownership — the claim-flow master signal,
    //    present even when no explicit master role row exists.
    let owned = organizations
        .find_owned_by_principal(principal.as_str())
        .await?;

    // 3. Union effective roles across all parties.
    let now = Utc::now();
    let mut effective = Vec::new();
    for party in &party_rows {
        let held = roles.find_active_by_party(party.id).await?;
        effective.extend(held.into_iter().filter(|r| r.is_effective(now)));
    }

    let mut is_master = owned.is_some();
    let mut candidate_orgs = BTreeSet::new();
    for role in &effective {
        if role.kind == RoleKind::Master {
            is_master = true;
        }
        match role.organization_id {
            Some(org_id) => {
                candidate_orgs.insert(org_id);
            }
            // A targetless role is only meaningful as the master root
            // grant. Anything else is a repair candidate.
            None if role.kind != RoleKind::Master => {
                reporter.report(
                    "role has no target organization and a non-master kind",
                    &IntegrityContext {
                        principal: Some(principal.clone()),
                        party_id: Some(role.party_id),
                        organization_id: None,
                    },
                );
            }
            None => {}
        }
    }

    // 4. Verify each granted organization still exists. Missing targets
    //    become broken grants, reported exactly once per resolution.
    let mut broken_grants = BTreeSet::new();
    for org_id in &candidate_orgs {
        match organizations.get_by_id(*org_id).await {
            Ok(_) => {}
            Err(FleetgateError::NotFound { .. }) => {
                broken_grants.insert(*org_id);
                reporter.report(
                    "role references missing organization",
                    &IntegrityContext {
                        principal: Some(principal.clone()),
                        party_id: None,
                        organization_id: Some(*org_id),
                    },
                );
            }
            Err(other) => return Err(other),
        }
    }

    // 5. Keep the strongest grant per surviving organization.
    let mut grants: BTreeMap<Uuid, OrgGrant> = BTreeMap::new();
    for role in &effective {
        let Some(org_id) = role.organization_id else {
            continue;
        };
        if broken_grants.contains(&org_id) {
            continue;
        }
        let candidate = OrgGrant {
            kind: role.kind,
            location_id: role.location_id,
        };
        grants
            .entry(org_id)
            .and_modify(|g| *g = stronger(*g, candidate))
            .or_insert(candidate);
    }

    Ok(Scope {
        principal: principal.clone(),
        is_master,
        owned_organization_id: owned.map(|o| o.id),
        grants,
        broken_grants,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grant(kind: RoleKind, location_id: Option<Uuid>) -> OrgGrant {
        OrgGrant { kind, location_id }
    }

    #[test]
    fn higher_rank_wins() {
        let weak = grant(RoleKind::Staff, None);
        let strong = grant(RoleKind::Organization, None);
        assert_eq!(stronger(weak, strong), strong);
        assert_eq!(stronger(strong, weak), strong);
    }

    #[test]
    fn unrestricted_beats_location_restricted_at_equal_rank() {
        let restricted = grant(RoleKind::Staff, Some(Uuid::new_v4()));
        let unrestricted = grant(RoleKind::Staff, None);
        assert_eq!(stronger(restricted, unrestricted), unrestricted);
        assert_eq!(stronger(unrestricted, restricted), unrestricted);
    }

    #[test]
    fn empty_scope_is_empty() {
        let scope = Scope {
            principal: PrincipalId::new("auth0|nobody"),
            is_master: false,
            owned_organization_id: None,
            grants: BTreeMap::new(),
            broken_grants: BTreeSet::new(),
        };
        assert!(scope.is_empty());
    }
}
