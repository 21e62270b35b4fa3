//! Person domain model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A person in an organization — typically a driver, sometimes office
/// staff. Anchored by its own party; membership in the organization is
/// carried by a role targeting it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub id: Uuid,
    pub party_id: Uuid,
    pub organization_id: Uuid,
    /// Home terminal/location, if assigned.
    pub location_id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub license_number: Option<String>,
    pub license_state: Option<String>,
    pub license_expiration: Option<NaiveDate>,
    pub hire_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new person (and their anchor party).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePerson {
    pub organization_id: Uuid,
    pub location_id: Option<Uuid>,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub license_number: Option<String>,
    pub license_state: Option<String>,
    pub license_expiration: Option<NaiveDate>,
    pub hire_date: Option<NaiveDate>,
    /// Identity-provider subject for the person, if they have a login.
    /// At most one person-party may exist per subject.
    pub external_user_id: Option<String>,
}

/// Fields that can be updated on an existing person.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdatePerson {
    pub location_id: Option<Option<Uuid>>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub license_number: Option<String>,
    pub license_state: Option<String>,
    pub license_expiration: Option<NaiveDate>,
}
