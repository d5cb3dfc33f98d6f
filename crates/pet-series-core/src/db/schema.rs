//! SQLite schema definition.

/// Complete database schema for the PET record store.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- PET Records
-- ============================================================================

-- One legacy three-slot record per patient, replaced wholesale on save
CREATE TABLE IF NOT EXISTS pet_records (
    patient_id TEXT PRIMARY KEY,
    payload TEXT NOT NULL,                        -- JSON {first, second, third}
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_pet_records_updated_at ON pet_records(updated_at);
"#;
