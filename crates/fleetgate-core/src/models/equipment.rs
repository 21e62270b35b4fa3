//! Equipment domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A power unit or trailer in an organization's fleet. Anchored by its
/// own party so inspections and accidents can reference it as a subject.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Equipment {
    pub id: Uuid,
    pub party_id: Uuid,
    pub organization_id: Uuid,
    pub location_id: Option<Uuid>,
    pub unit_number: String,
    pub vin: Option<String>,
    pub license_plate: Option<String>,
    pub plate_state: Option<String>,
    pub year: Option<u16>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new equipment unit (and its anchor party).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEquipment {
    pub organization_id: Uuid,
    pub location_id: Option<Uuid>,
    pub unit_number: String,
    pub vin: Option<String>,
    pub license_plate: Option<String>,
    pub plate_state: Option<String>,
    pub year: Option<u16>,
    pub make: Option<String>,
    pub model: Option<String>,
}

/// Fields that can be updated on an existing equipment unit.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UpdateEquipment {
    pub location_id: Option<Option<Uuid>>,
    pub unit_number: Option<String>,
    pub vin: Option<String>,
    pub license_plate: Option<String>,
    pub plate_state: Option<String>,
    pub year: Option<u16>,
    pub make: Option<String>,
    pub model: Option<String>,
}
