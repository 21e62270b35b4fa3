//! Organization domain model.
//!
//! Organizations are the tenants of the system. Each is anchored by its
//! own party; drivers and equipment belong to an organization through
//! roles targeting it, locations through a direct foreign key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A motor-carrier organization.
///
/// Claiming an organization binds its anchor party's external user id to
/// the claiming principal; that direct ownership is one of the two master
/// signals honored by the scope resolver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: Uuid,
    /// The party anchoring this organization.
    pub party_id: Uuid,
    pub name: String,
    /// USDOT number, if registered.
    pub dot_number: Option<String>,
    /// Motor carrier (MC) number, if any.
    pub mc_number: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new organization (and its anchor party).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrganization {
    pub name: String,
    pub dot_number: Option<String>,
    pub mc_number: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub phone: Option<String>,
    /// Principal claiming the organization at creation time, if any.
    pub external_user_id: Option<String>,
}

/// Fields that can be updated on an existing organization.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateOrganization {
    pub name: Option<String>,
    pub dot_number: Option<String>,
    pub mc_number: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub phone: Option<String>,
}
