//! Consultant domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An external DOT-compliance consultant. Anchored by its own party;
/// access into client organizations is granted through consultant-kind
/// roles targeting them. Consultant grants confer access, not
/// membership — consultants never appear in an organization's cohort.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Consultant {
    pub id: Uuid,
    pub party_id: Uuid,
    pub name: String,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to create a new consultant (and their anchor party).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateConsultant {
    pub name: String,
    pub company: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Identity-provider subject. At most one consultant-party may exist
    /// per subject.
    pub external_user_id: String,
}
