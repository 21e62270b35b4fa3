//! Role domain model.
//!
//! A role grants a party (the grantee) access into an organization at a
//! specific privilege kind. Roles are soft-deleted: deactivation clears
//! `is_active` and stamps `end_date`, never removes the row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::party::PartyKind;

/// Privilege kind of a role grant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RoleKind {
    Master,
    Admin,
    Organization,
    Manager,
    Staff,
    Consultant,
    Location,
}

impl RoleKind {
    /// Relative privilege used for strongest-grant selection and the
    /// organization-administration gate. Higher is stronger.
    pub fn privilege_rank(self) -> u8 {
        match self {
            RoleKind::Master => 6,
            RoleKind::Admin => 5,
            RoleKind::Organization => 4,
            RoleKind::Manager => 3,
            RoleKind::Consultant => 2,
            RoleKind::Staff => 1,
            RoleKind::Location => 0,
        }
    }

    /// Whether this kind may administer an organization's own structure
    /// (locations, organization profile, role grants).
    pub fn can_administer_organization(self) -> bool {
        self.privilege_rank() >= RoleKind::Organization.privilege_rank()
    }
}

/// A grant binding a party to an optional target organization.
///
/// A `Master` role with no `organization_id` is the root grant; a role
/// with a target denotes delegated access into that organization.
/// `location_id` further restricts `Location`-kind grants to one
/// location's entities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub id: Uuid,
    pub party_id: Uuid,
    pub organization_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub kind: RoleKind,
    pub is_active: bool,
    pub status: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Role {
    /// A role is effective when it is active and `now` falls within its
    /// optional start/end window (unset bounds are open).
    pub fn is_effective(&self, now: DateTime<Utc>) -> bool {
        if !self.is_active {
            return false;
        }
        if let Some(start) = self.start_date {
            if now < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if now > end {
                return false;
            }
        }
        true
    }
}

/// Fields required to grant a new role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRole {
    pub party_id: Uuid,
    pub organization_id: Option<Uuid>,
    pub location_id: Option<Uuid>,
    pub kind: RoleKind,
    pub status: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// Party-kind/role-kind pair for a role targeting an organization, as
/// returned by the target query used to materialize org membership.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleTarget {
    pub party_id: Uuid,
    pub party_kind: PartyKind,
    pub role_kind: RoleKind,
    pub location_id: Option<Uuid>,
}
