//! Party domain model.
//!
//! A party is the universal identity anchor: every person, organization,
//! equipment unit, and consultant is backed by exactly one party record.
//! The party's kind is determined by which sub-record exists for it; a
//! party must never own two kind-defining sub-records. That invariant is
//! enforced by the write paths, not assumed by readers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PartyStatus {
    Active,
    Inactive,
}

/// Which kind-defining sub-record a party owns.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PartyKind {
    Person,
    Organization,
    Equipment,
    Consultant,
}

/// Universal identity anchor.
///
/// `external_user_id` is the identity provider's stable subject for the
/// principal that controls this party, if any. Historically more than one
/// party can carry the same subject (see the duplicate-party handling in
/// the scope resolver); readers must tolerate that, and writers reject
/// creating new duplicates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Party {
    pub id: Uuid,
    pub external_user_id: Option<String>,
    pub status: PartyStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
