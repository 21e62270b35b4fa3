//! Access decision engine.
//!
//! A pure policy function over a resolved [`Scope`]: no data fetching
//! happens here, and no reporting — [`authorize`] only classifies. The
//! precedence order is fixed: master bypass, then integrity check on the
//! target, then the organization grant with per-kind and per-location
//! refinement, then deny.

use std::fmt;

use fleetgate_core::models::role::RoleKind;
use uuid::Uuid;

use crate::error::AuthzError;
use crate::scope::Scope;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    View,
    Create,
    Update,
    Delete,
}

/// The kinds of resource the back office authorizes operations on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Organization,
    Location,
    Role,
    Driver,
    Equipment,
    Inspection,
    Accident,
    License,
    Training,
    DrugAlcohol,
    Registration,
    Caf,
}

impl ResourceKind {
    /// Compliance records that consultants manage on behalf of client
    /// organizations.
    fn is_compliance_record(self) -> bool {
        matches!(
            self,
            ResourceKind::Inspection
                | ResourceKind::Accident
                | ResourceKind::License
                | ResourceKind::Training
                | ResourceKind::DrugAlcohol
                | ResourceKind::Registration
                | ResourceKind::Caf
        )
    }
}

/// A requested operation on a target entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    pub action: Action,
    pub resource: ResourceKind,
}

impl Operation {
    pub fn view(resource: ResourceKind) -> Self {
        Self {
            action: Action::View,
            resource,
        }
    }

    pub fn create(resource: ResourceKind) -> Self {
        Self {
            action: Action::Create,
            resource,
        }
    }

    pub fn update(resource: ResourceKind) -> Self {
        Self {
            action: Action::Update,
            resource,
        }
    }

    pub fn delete(resource: ResourceKind) -> Self {
        Self {
            action: Action::Delete,
            resource,
        }
    }

    /// Mutations of an organization's own structure: its profile, its
    /// locations, and its role grants. These require organization-rank
    /// privilege — a location-kind role must never create peer
    /// locations.
    fn is_org_administration(&self) -> bool {
        !matches!(self.action, Action::View)
            && matches!(
                self.resource,
                ResourceKind::Organization | ResourceKind::Location | ResourceKind::Role
            )
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = match self.action {
            Action::View => "view",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        };
        let resource = match self.resource {
            ResourceKind::Organization => "organization",
            ResourceKind::Location => "location",
            ResourceKind::Role => "role",
            ResourceKind::Driver => "driver",
            ResourceKind::Equipment => "equipment",
            ResourceKind::Inspection => "inspection",
            ResourceKind::Accident => "accident",
            ResourceKind::License => "license",
            ResourceKind::Training => "training",
            ResourceKind::DrugAlcohol => "drug_alcohol",
            ResourceKind::Registration => "registration",
            ResourceKind::Caf => "caf",
        };
        write!(f, "{action}_{resource}")
    }
}

/// Why an operation was allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessBasis {
    /// Master principals bypass organization scoping entirely.
    Master,
    /// An effective grant on the target organization.
    Grant(RoleKind),
}

/// Why an operation was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    Unauthenticated,
    /// No effective grant covers the target organization, or the grant's
    /// location restriction excludes the target entity.
    NotInScope,
    /// A grant covers the organization but its kind does not permit the
    /// requested operation.
    InvalidOperation,
    /// The only grant covering the target references an organization
    /// that no longer exists. Deny-by-default, never silently grant.
    IntegrityViolation,
}

/// Outcome of an access decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed(AccessBasis),
    Denied(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed(_))
    }

    /// Converts a denial into the matching [`AuthzError`] for `?`-style
    /// use in request handlers.
    pub fn require(
        self,
        operation: Operation,
        organization_id: Uuid,
    ) -> Result<AccessBasis, AuthzError> {
        match self {
            Decision::Allowed(basis) => Ok(basis),
            Decision::Denied(DenyReason::Unauthenticated) => Err(AuthzError::Unauthenticated),
            Decision::Denied(DenyReason::NotInScope) => {
                Err(AuthzError::NotInScope { organization_id })
            }
            Decision::Denied(DenyReason::InvalidOperation) => Err(AuthzError::InvalidOperation {
                operation: operation.to_string(),
                organization_id,
            }),
            Decision::Denied(DenyReason::IntegrityViolation) => {
                Err(AuthzError::Integrity { organization_id })
            }
        }
    }
}

/// Whether a role kind permits an operation within its organization,
/// before any location filtering.
fn kind_permits(kind: RoleKind, operation: &Operation) -> bool {
    if operation.is_org_administration() {
        return kind.can_administer_organization();
    }
    match kind {
        RoleKind::Master | RoleKind::Admin | RoleKind::Organization | RoleKind::Manager => true,
        // Consultants manage compliance records for their client
        // organizations and read everything else.
        RoleKind::Consultant => {
            operation.action == Action::View || operation.resource.is_compliance_record()
        }
        // Staff and location roles do data entry but never delete.
        RoleKind::Staff | RoleKind::Location => operation.action != Action::Delete,
    }
}

/// Decides whether `scope` permits `operation` on the target
/// organization.
///
/// `target_location_id` is the owning location of the specific entity
/// being operated on, when there is one; location-kind grants are
/// restricted to entities of their own location, so an entity with no
/// location (or an org-level operation) is out of reach for them.
pub fn authorize(
    scope: &Scope,
    operation: Operation,
    target_organization_id: Uuid,
    target_location_id: Option<Uuid>,
) -> Decision {
    // 1. Masters bypass organization scoping entirely.
    if scope.is_master {
        return Decision::Allowed(AccessBasis::Master);
    }

    // 2. A grant whose organization vanished denies as an integrity
    //    violation, not as out-of-scope.
    if scope.broken_grants.contains(&target_organization_id) {
        return Decision::Denied(DenyReason::IntegrityViolation);
    }

    // 3. The organization grant, refined per kind and location.
    let Some(grant) = scope.grant_for(target_organization_id) else {
        return Decision::Denied(DenyReason::NotInScope);
    };

    if !kind_permits(grant.kind, &operation) {
        return Decision::Denied(DenyReason::InvalidOperation);
    }

    if grant.kind == RoleKind::Location {
        // A location role with no location target degrades to staff
        // breadth; with one, the entity must belong to that location.
        if let Some(granted_location) = grant.location_id {
            if target_location_id != Some(granted_location) {
                return Decision::Denied(DenyReason::NotInScope);
            }
        }
    }

    Decision::Allowed(AccessBasis::Grant(grant.kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::PrincipalId;
    use crate::scope::OrgGrant;
    use std::collections::{BTreeMap, BTreeSet};

    fn scope_with_grant(org: Uuid, grant: OrgGrant) -> Scope {
        let mut grants = BTreeMap::new();
        grants.insert(org, grant);
        Scope {
            principal: PrincipalId::new("auth0|test"),
            is_master: false,
            owned_organization_id: None,
            grants,
            broken_grants: BTreeSet::new(),
        }
    }

    #[test]
    fn master_bypasses_everything() {
        let scope = Scope {
            principal: PrincipalId::new("auth0|root"),
            is_master: true,
            owned_organization_id: None,
            grants: BTreeMap::new(),
            broken_grants: BTreeSet::new(),
        };
        let decision = authorize(
            &scope,
            Operation::delete(ResourceKind::Organization),
            Uuid::new_v4(),
            None,
        );
        assert_eq!(decision, Decision::Allowed(AccessBasis::Master));
    }

    #[test]
    fn no_grant_is_not_in_scope() {
        let scope = scope_with_grant(
            Uuid::new_v4(),
            OrgGrant {
                kind: RoleKind::Organization,
                location_id: None,
            },
        );
        let other_org = Uuid::new_v4();
        let decision = authorize(&scope, Operation::view(ResourceKind::Driver), other_org, None);
        assert_eq!(decision, Decision::Denied(DenyReason::NotInScope));
    }

    #[test]
    fn location_role_cannot_create_peer_locations() {
        let org = Uuid::new_v4();
        let loc = Uuid::new_v4();
        let scope = scope_with_grant(
            org,
            OrgGrant {
                kind: RoleKind::Location,
                location_id: Some(loc),
            },
        );
        let decision = authorize(&scope, Operation::create(ResourceKind::Location), org, None);
        assert_eq!(decision, Decision::Denied(DenyReason::InvalidOperation));
    }

    #[test]
    fn location_role_sees_its_own_location_only() {
        let org = Uuid::new_v4();
        let loc = Uuid::new_v4();
        let scope = scope_with_grant(
            org,
            OrgGrant {
                kind: RoleKind::Location,
                location_id: Some(loc),
            },
        );

        let same = authorize(&scope, Operation::view(ResourceKind::Driver), org, Some(loc));
        assert_eq!(same, Decision::Allowed(AccessBasis::Grant(RoleKind::Location)));

        let elsewhere = authorize(
            &scope,
            Operation::view(ResourceKind::Driver),
            org,
            Some(Uuid::new_v4()),
        );
        assert_eq!(elsewhere, Decision::Denied(DenyReason::NotInScope));

        // An entity with no owning location is out of reach too.
        let unlocated = authorize(&scope, Operation::view(ResourceKind::Driver), org, None);
        assert_eq!(unlocated, Decision::Denied(DenyReason::NotInScope));
    }

    #[test]
    fn broken_grant_denies_as_integrity_violation() {
        let org = Uuid::new_v4();
        let mut broken = BTreeSet::new();
        broken.insert(org);
        let scope = Scope {
            principal: PrincipalId::new("auth0|test"),
            is_master: false,
            owned_organization_id: None,
            grants: BTreeMap::new(),
            broken_grants: broken,
        };
        let decision = authorize(&scope, Operation::view(ResourceKind::Driver), org, None);
        assert_eq!(decision, Decision::Denied(DenyReason::IntegrityViolation));
    }

    #[test]
    fn consultant_manages_compliance_but_not_drivers() {
        let org = Uuid::new_v4();
        let scope = scope_with_grant(
            org,
            OrgGrant {
                kind: RoleKind::Consultant,
                location_id: None,
            },
        );

        let caf = authorize(&scope, Operation::create(ResourceKind::Caf), org, None);
        assert!(caf.is_allowed());

        let read_driver = authorize(&scope, Operation::view(ResourceKind::Driver), org, None);
        assert!(read_driver.is_allowed());

        let edit_driver = authorize(&scope, Operation::update(ResourceKind::Driver), org, None);
        assert_eq!(edit_driver, Decision::Denied(DenyReason::InvalidOperation));
    }

    #[test]
    fn staff_cannot_delete() {
        let org = Uuid::new_v4();
        let scope = scope_with_grant(
            org,
            OrgGrant {
                kind: RoleKind::Staff,
                location_id: None,
            },
        );
        let decision = authorize(&scope, Operation::delete(ResourceKind::Inspection), org, None);
        assert_eq!(decision, Decision::Denied(DenyReason::InvalidOperation));
    }
}
