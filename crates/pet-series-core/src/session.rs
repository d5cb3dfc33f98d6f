//! Editing session for one patient's PET series.
//!
//! A session is seeded from the patient's stored record, mutated in memory, and written
//! back only when [`PetSession::save`] is called. Selecting another patient discards the
//! series and seeds a new one.

use tracing::debug;

use crate::db::{Database, DbError, DbResult};
use crate::models::{LegacyShape, ReadingField, TimePoint};
use crate::series::{seed_from_legacy, to_legacy_shape, EntryId, TestSeries};

/// One patient's series plus unsaved-change tracking.
#[derive(Debug, Clone)]
pub struct PetSession {
    patient_id: String,
    series: TestSeries,
    dirty: bool,
}

impl PetSession {
    /// Load a patient's record. A patient with no record starts with an empty series.
    pub fn load(db: &Database, patient_id: &str) -> DbResult<Self> {
        let patient_id = patient_id.trim();
        if patient_id.is_empty() {
            return Err(DbError::Constraint("patient id cannot be empty".into()));
        }

        let shape = db.fetch_pet_record(patient_id)?.unwrap_or_default();
        let series = seed_from_legacy(&shape);
        debug!(patient_id, tests = series.len(), "loaded PET session");

        Ok(Self {
            patient_id: patient_id.to_string(),
            series,
            dirty: false,
        })
    }

    /// Replace this session with another patient's. On error the current session is kept.
    pub fn switch_patient(&mut self, db: &Database, patient_id: &str) -> DbResult<()> {
        *self = Self::load(db, patient_id)?;
        Ok(())
    }

    pub fn patient_id(&self) -> &str {
        &self.patient_id
    }

    pub fn series(&self) -> &TestSeries {
        &self.series
    }

    /// True if the series changed since it was loaded or last saved.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The record as it would be saved now.
    pub fn legacy_shape(&self) -> LegacyShape {
        to_legacy_shape(&self.series)
    }

    /// Write the current record, replacing what is stored.
    pub fn save(&mut self, db: &Database) -> DbResult<LegacyShape> {
        let shape = self.legacy_shape();
        db.replace_pet_record(&self.patient_id, &shape)?;
        self.dirty = false;
        debug!(patient_id = %self.patient_id, tests = self.series.len(), "saved PET session");
        Ok(shape)
    }

    pub fn add_entry(&mut self) -> EntryId {
        self.dirty = true;
        self.series.add_entry()
    }

    pub fn remove_entry(&mut self, id: EntryId) -> bool {
        let changed = self.series.remove_entry(id);
        self.mark(changed)
    }

    /// Selection is not part of the record and does not dirty the session.
    pub fn set_active(&mut self, id: EntryId) -> bool {
        self.series.set_active(id)
    }

    pub fn update_measurement(
        &mut self,
        id: EntryId,
        time_point: TimePoint,
        field: ReadingField,
        value: impl Into<String>,
    ) -> bool {
        let changed = self.series.update_measurement(id, time_point, field, value);
        self.mark(changed)
    }

    pub fn update_test_date(&mut self, id: EntryId, date: impl Into<String>) -> bool {
        let changed = self.series.update_test_date(id, date);
        self.mark(changed)
    }

    fn mark(&mut self, changed: bool) -> bool {
        self.dirty |= changed;
        changed
    }
}
