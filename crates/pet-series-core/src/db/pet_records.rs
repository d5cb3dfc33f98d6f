//! PET record database operations.

use rusqlite::{params, OptionalExtension};
use tracing::{debug, warn};

use super::{Database, DbError, DbResult};
use crate::models::LegacyShape;

impl Database {
    /// Get the current record for a patient.
    pub fn fetch_pet_record(&self, patient_id: &str) -> DbResult<Option<LegacyShape>> {
        let patient_id = validate_patient_id(patient_id)?;
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM pet_records WHERE patient_id = ?",
                [patient_id],
                |row| row.get(0),
            )
            .optional()?;

        payload
            .map(|json| {
                LegacyShape::from_json(&json).map_err(|e| {
                    warn!(patient_id, error = %e, "stored PET record is not a valid legacy record");
                    DbError::from(e)
                })
            })
            .transpose()
    }

    /// Get the current record as JSON, normalized to the full three-slot shape.
    pub fn fetch_pet_record_json(&self, patient_id: &str) -> DbResult<Option<String>> {
        self.fetch_pet_record(patient_id)?
            .map(|shape| shape.to_json().map_err(DbError::from))
            .transpose()
    }

    /// Replace the current record for a patient, creating it if needed.
    pub fn replace_pet_record(&self, patient_id: &str, shape: &LegacyShape) -> DbResult<()> {
        let patient_id = validate_patient_id(patient_id)?;
        let payload = shape.to_json()?;

        self.conn.execute(
            r#"
            INSERT INTO pet_records (patient_id, payload)
            VALUES (?1, ?2)
            ON CONFLICT(patient_id) DO UPDATE SET
                payload = excluded.payload,
                updated_at = datetime('now')
            "#,
            params![patient_id, payload],
        )?;
        debug!(patient_id, "replaced PET record");
        Ok(())
    }

    /// Replace the current record from raw JSON. The payload is parsed leniently and
    /// stored in normalized form.
    pub fn replace_pet_record_json(&self, patient_id: &str, json: &str) -> DbResult<()> {
        let shape = LegacyShape::from_json(json)?;
        self.replace_pet_record(patient_id, &shape)
    }

    /// Delete a patient's record.
    pub fn delete_pet_record(&self, patient_id: &str) -> DbResult<bool> {
        let patient_id = validate_patient_id(patient_id)?;
        let rows_affected = self
            .conn
            .execute("DELETE FROM pet_records WHERE patient_id = ?", [patient_id])?;
        Ok(rows_affected > 0)
    }

    /// List patients that have a stored record.
    pub fn list_pet_record_patients(&self) -> DbResult<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT patient_id FROM pet_records ORDER BY patient_id")?;
        let rows = stmt.query_map([], |row| row.get(0))?;

        let mut patients = Vec::new();
        for row in rows {
            patients.push(row?);
        }
        Ok(patients)
    }
}

fn validate_patient_id(patient_id: &str) -> DbResult<&str> {
    let trimmed = patient_id.trim();
    if trimmed.is_empty() {
        return Err(DbError::Constraint("patient id cannot be empty".into()));
    }
    Ok(trimmed)
}
