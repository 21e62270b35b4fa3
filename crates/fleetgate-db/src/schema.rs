//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints for validation. Calendar dates (license
//! expirations, due dates) are stored as `YYYY-MM-DD` strings;
//! instants as datetimes.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — party graph and compliance records
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Parties (universal identity anchors)
-- =======================================================================
DEFINE TABLE party SCHEMAFULL;
DEFINE FIELD external_user_id ON TABLE party TYPE option<string>;
DEFINE FIELD status ON TABLE party TYPE string \
    ASSERT $value IN ['Active', 'Inactive'];
DEFINE FIELD created_at ON TABLE party TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE party TYPE datetime \
    DEFAULT time::now();
-- Deliberately not unique: duplicate parties per subject exist in the
-- wild and are handled at read time; writers reject new duplicates.
DEFINE INDEX idx_party_external_user ON TABLE party \
    COLUMNS external_user_id;

-- =======================================================================
-- Organizations (tenants)
-- =======================================================================
DEFINE TABLE organization SCHEMAFULL;
DEFINE FIELD party_id ON TABLE organization TYPE string;
DEFINE FIELD name ON TABLE organization TYPE string;
DEFINE FIELD dot_number ON TABLE organization TYPE option<string>;
DEFINE FIELD mc_number ON TABLE organization TYPE option<string>;
DEFINE FIELD address ON TABLE organization TYPE option<string>;
DEFINE FIELD city ON TABLE organization TYPE option<string>;
DEFINE FIELD state ON TABLE organization TYPE option<string>;
DEFINE FIELD zip ON TABLE organization TYPE option<string>;
DEFINE FIELD phone ON TABLE organization TYPE option<string>;
DEFINE FIELD created_at ON TABLE organization TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE organization TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_organization_party ON TABLE organization \
    COLUMNS party_id UNIQUE;

-- =======================================================================
-- Persons (drivers and office staff)
-- =======================================================================
DEFINE TABLE person SCHEMAFULL;
DEFINE FIELD party_id ON TABLE person TYPE string;
DEFINE FIELD organization_id ON TABLE person TYPE string;
DEFINE FIELD location_id ON TABLE person TYPE option<string>;
DEFINE FIELD first_name ON TABLE person TYPE string;
DEFINE FIELD last_name ON TABLE person TYPE string;
DEFINE FIELD email ON TABLE person TYPE option<string>;
DEFINE FIELD phone ON TABLE person TYPE option<string>;
DEFINE FIELD date_of_birth ON TABLE person TYPE option<string>;
DEFINE FIELD license_number ON TABLE person TYPE option<string>;
DEFINE FIELD license_state ON TABLE person TYPE option<string>;
DEFINE FIELD license_expiration ON TABLE person TYPE option<string>;
DEFINE FIELD hire_date ON TABLE person TYPE option<string>;
DEFINE FIELD created_at ON TABLE person TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE person TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_person_party ON TABLE person COLUMNS party_id UNIQUE;
DEFINE INDEX idx_person_org ON TABLE person COLUMNS organization_id;

-- =======================================================================
-- Equipment (power units and trailers)
-- =======================================================================
DEFINE TABLE equipment SCHEMAFULL;
DEFINE FIELD party_id ON TABLE equipment TYPE string;
DEFINE FIELD organization_id ON TABLE equipment TYPE string;
DEFINE FIELD location_id ON TABLE equipment TYPE option<string>;
DEFINE FIELD unit_number ON TABLE equipment TYPE string;
DEFINE FIELD vin ON TABLE equipment TYPE option<string>;
DEFINE FIELD license_plate ON TABLE equipment TYPE option<string>;
DEFINE FIELD plate_state ON TABLE equipment TYPE option<string>;
DEFINE FIELD year ON TABLE equipment TYPE option<int>;
DEFINE FIELD make ON TABLE equipment TYPE option<string>;
DEFINE FIELD model ON TABLE equipment TYPE option<string>;
DEFINE FIELD created_at ON TABLE equipment TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE equipment TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_equipment_party ON TABLE equipment \
    COLUMNS party_id UNIQUE;
DEFINE INDEX idx_equipment_org ON TABLE equipment \
    COLUMNS organization_id;

-- =======================================================================
-- Consultants
-- =======================================================================
DEFINE TABLE consultant SCHEMAFULL;
DEFINE FIELD party_id ON TABLE consultant TYPE string;
DEFINE FIELD name ON TABLE consultant TYPE string;
DEFINE FIELD company ON TABLE consultant TYPE option<string>;
DEFINE FIELD email ON TABLE consultant TYPE option<string>;
DEFINE FIELD phone ON TABLE consultant TYPE option<string>;
DEFINE FIELD created_at ON TABLE consultant TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE consultant TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_consultant_party ON TABLE consultant \
    COLUMNS party_id UNIQUE;

-- =======================================================================
-- Locations (terminals/yards; anchored directly by organization)
-- =======================================================================
DEFINE TABLE location SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE location TYPE string;
DEFINE FIELD name ON TABLE location TYPE string;
DEFINE FIELD address ON TABLE location TYPE option<string>;
DEFINE FIELD city ON TABLE location TYPE option<string>;
DEFINE FIELD state ON TABLE location TYPE option<string>;
DEFINE FIELD zip ON TABLE location TYPE option<string>;
DEFINE FIELD created_at ON TABLE location TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE location TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_location_org ON TABLE location \
    COLUMNS organization_id;

-- =======================================================================
-- Roles (grants; soft-deleted, never removed)
-- =======================================================================
DEFINE TABLE role SCHEMAFULL;
DEFINE FIELD party_id ON TABLE role TYPE string;
DEFINE FIELD organization_id ON TABLE role TYPE option<string>;
DEFINE FIELD location_id ON TABLE role TYPE option<string>;
DEFINE FIELD kind ON TABLE role TYPE string \
    ASSERT $value IN ['Master', 'Admin', 'Organization', 'Manager', \
    'Staff', 'Consultant', 'Location'];
DEFINE FIELD is_active ON TABLE role TYPE bool DEFAULT true;
DEFINE FIELD status ON TABLE role TYPE string DEFAULT 'Active';
DEFINE FIELD start_date ON TABLE role TYPE option<datetime>;
DEFINE FIELD end_date ON TABLE role TYPE option<datetime>;
DEFINE FIELD created_at ON TABLE role TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE role TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_role_party ON TABLE role COLUMNS party_id;
DEFINE INDEX idx_role_org ON TABLE role COLUMNS organization_id;

-- =======================================================================
-- Issues (polymorphic compliance records)
-- =======================================================================
DEFINE TABLE issue SCHEMAFULL;
DEFINE FIELD party_id ON TABLE issue TYPE string;
DEFINE FIELD organization_id ON TABLE issue TYPE string;
DEFINE FIELD kind ON TABLE issue TYPE string \
    ASSERT $value IN ['RoadsideInspection', 'Accident', 'License', \
    'Training', 'DrugAlcohol', 'Registration'];
DEFINE FIELD status ON TABLE issue TYPE string \
    ASSERT $value IN ['Open', 'InProgress', 'Closed'];
DEFINE FIELD priority ON TABLE issue TYPE string \
    ASSERT $value IN ['Low', 'Medium', 'High', 'Critical'];
DEFINE FIELD title ON TABLE issue TYPE string;
DEFINE FIELD detail ON TABLE issue TYPE object FLEXIBLE DEFAULT {};
DEFINE FIELD occurred_at ON TABLE issue TYPE option<datetime>;
DEFINE FIELD created_at ON TABLE issue TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE issue TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_issue_party ON TABLE issue COLUMNS party_id;
DEFINE INDEX idx_issue_org ON TABLE issue COLUMNS organization_id;

-- =======================================================================
-- Violations (attached to inspection/accident issues)
-- =======================================================================
DEFINE TABLE violation SCHEMAFULL;
DEFINE FIELD issue_id ON TABLE violation TYPE string;
DEFINE FIELD code ON TABLE violation TYPE string;
DEFINE FIELD description ON TABLE violation TYPE string;
DEFINE FIELD out_of_service ON TABLE violation TYPE bool DEFAULT false;
DEFINE FIELD severity_weight ON TABLE violation TYPE option<int>;
DEFINE FIELD unit ON TABLE violation TYPE option<int>;
DEFINE FIELD created_at ON TABLE violation TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_violation_issue ON TABLE violation COLUMNS issue_id;

-- =======================================================================
-- Corrective action forms
-- =======================================================================
DEFINE TABLE caf SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE caf TYPE string;
DEFINE FIELD issue_id ON TABLE caf TYPE string;
DEFINE FIELD violation_ids ON TABLE caf TYPE array;
DEFINE FIELD violation_ids.* ON TABLE caf TYPE string;
DEFINE FIELD code ON TABLE caf TYPE string;
DEFINE FIELD status ON TABLE caf TYPE string \
    ASSERT $value IN ['Draft', 'Assigned', 'Completed', 'Closed'];
DEFINE FIELD assigned_party_id ON TABLE caf TYPE option<string>;
DEFINE FIELD due_date ON TABLE caf TYPE option<string>;
DEFINE FIELD notes ON TABLE caf TYPE option<string>;
DEFINE FIELD created_at ON TABLE caf TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE caf TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_caf_org ON TABLE caf COLUMNS organization_id;
DEFINE INDEX idx_caf_issue ON TABLE caf COLUMNS issue_id;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
/// All DEFINE statements are idempotent so re-running is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_v1_is_nonempty() {
        assert!(!SCHEMA_V1.is_empty());
    }

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(
                window[0].version < window[1].version,
                "Migrations must be in ascending version order"
            );
        }
    }

    #[test]
    fn schema_defines_every_party_graph_table() {
        for table in [
            "party",
            "organization",
            "person",
            "equipment",
            "consultant",
            "location",
            "role",
            "issue",
            "violation",
            "caf",
        ] {
            assert!(
                SCHEMA_V1.contains(&format!("DEFINE TABLE {table} SCHEMAFULL")),
                "missing table definition: {table}"
            );
        }
    }
}
