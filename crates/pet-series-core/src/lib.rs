//! PET Series Core Library
//!
//! Peritoneal Equilibration Test (PET) records for a renal unit: raw timed readings,
//! derived transport ratios and classes, and a dynamic list of tests kept compatible
//! with the three-slot record the rest of the application stores.
//!
//! # Architecture
//!
//! ```text
//!   stored record {first, second, third}
//!                   │
//!          seed_from_legacy  ── re-derive every ratio and class
//!                   │
//!          ┌────────▼────────┐
//!          │   TestSeries    │  add / remove / set active / update reading
//!          │  Test 1..Test N │  (each update re-runs the engine)
//!          └────────┬────────┘
//!                   │
//!          to_legacy_shape   ── positions 1-3 only
//!                   │
//!   replace stored record (on explicit save)
//! ```
//!
//! # Core Principle
//!
//! **Derived values are never trusted from storage.** Ratios and classes are recomputed on
//! every load and every reading change.
//!
//! # Modules
//!
//! - [`models`]: Readings, transport classes, and the legacy record shape
//! - [`engine`]: D/P creatinine and D/D0 glucose ratios and their classification
//! - [`series`]: Ordered test list and the legacy adapters
//! - [`session`]: Per-patient load / edit / save
//! - [`db`]: SQLite record store
//! - [`config`]: Startup configuration

pub mod config;
pub mod db;
pub mod engine;
pub mod models;
pub mod series;
pub mod session;

// Re-export commonly used types
pub use config::CoreConfig;
pub use db::Database;
pub use engine::{derive_results, DerivedResults};
pub use models::{
    LegacyShape, LegacySlot, MeasurementPayload, MeasurementStore, ReadingField, TimePoint,
    TimePoints, TransportClass,
};
pub use series::{seed_from_legacy, to_legacy_shape, EntryId, TestEntry, TestSeries};
pub use session::PetSession;

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum PetSeriesError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("No patient loaded")]
    NoPatientLoaded,
}

impl From<db::DbError> for PetSeriesError {
    fn from(e: db::DbError) -> Self {
        match e {
            db::DbError::Constraint(msg) => PetSeriesError::InvalidInput(msg),
            db::DbError::Json(e) => PetSeriesError::SerializationError(e.to_string()),
            other => PetSeriesError::DatabaseError(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for PetSeriesError {
    fn from(e: serde_json::Error) -> Self {
        PetSeriesError::SerializationError(e.to_string())
    }
}

impl From<config::ConfigError> for PetSeriesError {
    fn from(e: config::ConfigError) -> Self {
        PetSeriesError::InvalidInput(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for PetSeriesError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        PetSeriesError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path.
#[uniffi::export]
pub fn open_database(path: String) -> Result<Arc<PetSeriesCore>, PetSeriesError> {
    let db = Database::open(&path)?;
    Ok(Arc::new(PetSeriesCore::with_database(db)))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_database_in_memory() -> Result<Arc<PetSeriesCore>, PetSeriesError> {
    let db = Database::open_in_memory()?;
    Ok(Arc::new(PetSeriesCore::with_database(db)))
}

/// Open the database named by `PET_SERIES_DB_PATH` (in-memory when unset).
#[uniffi::export]
pub fn open_database_from_env() -> Result<Arc<PetSeriesCore>, PetSeriesError> {
    let config = CoreConfig::from_env()?;
    let db = Database::open_with_config(&config)?;
    Ok(Arc::new(PetSeriesCore::with_database(db)))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe database and session wrapper for FFI.
#[derive(uniffi::Object)]
pub struct PetSeriesCore {
    db: Arc<Mutex<Database>>,
    session: Mutex<Option<PetSession>>,
}

#[uniffi::export]
impl PetSeriesCore {
    // =========================================================================
    // Patient Context
    // =========================================================================

    /// Load a patient's PET tests, discarding any unsaved edits for the previous patient.
    pub fn load_patient(&self, patient_id: String) -> Result<FfiSeries, PetSeriesError> {
        let db = self.db.lock()?;
        let session = PetSession::load(&db, &patient_id)?;
        let series = FfiSeries::from(&session);
        *self.session.lock()? = Some(session);
        Ok(series)
    }

    /// The patient currently loaded, if any.
    pub fn current_patient(&self) -> Result<Option<String>, PetSeriesError> {
        let session = self.session.lock()?;
        Ok(session.as_ref().map(|s| s.patient_id().to_string()))
    }

    /// Current state of the series.
    pub fn get_series(&self) -> Result<FfiSeries, PetSeriesError> {
        self.with_session(|session| FfiSeries::from(&*session))
    }

    // =========================================================================
    // Series Editing
    // =========================================================================

    /// Append an empty test and make it active.
    pub fn add_test(&self) -> Result<FfiSeries, PetSeriesError> {
        self.with_session(|session| {
            session.add_entry();
            FfiSeries::from(&*session)
        })
    }

    /// Remove a test. Unknown ids leave the series unchanged.
    pub fn remove_test(&self, entry_id: String) -> Result<FfiSeries, PetSeriesError> {
        let id = parse_entry_id(&entry_id)?;
        self.with_session(|session| {
            session.remove_entry(id);
            FfiSeries::from(&*session)
        })
    }

    /// Select the test being edited.
    pub fn set_active_test(&self, entry_id: String) -> Result<FfiSeries, PetSeriesError> {
        let id = parse_entry_id(&entry_id)?;
        self.with_session(|session| {
            session.set_active(id);
            FfiSeries::from(&*session)
        })
    }

    /// Set one reading, e.g. (`"t4"`, `"dialysateCreatinine"`, `"1.64"`).
    pub fn update_measurement(
        &self,
        entry_id: String,
        time_point: String,
        field: String,
        value: String,
    ) -> Result<FfiSeries, PetSeriesError> {
        let id = parse_entry_id(&entry_id)?;
        let time_point = TimePoint::from_key(&time_point).ok_or_else(|| {
            PetSeriesError::InvalidInput(format!("Unknown time point: {}", time_point))
        })?;
        let field = ReadingField::from_key(&field)
            .ok_or_else(|| PetSeriesError::InvalidInput(format!("Unknown reading: {}", field)))?;

        self.with_session(|session| {
            session.update_measurement(id, time_point, field, value);
            FfiSeries::from(&*session)
        })
    }

    /// Set a test's date.
    pub fn update_test_date(
        &self,
        entry_id: String,
        date: String,
    ) -> Result<FfiSeries, PetSeriesError> {
        let id = parse_entry_id(&entry_id)?;
        self.with_session(|session| {
            session.update_test_date(id, date);
            FfiSeries::from(&*session)
        })
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// The three-slot record as it would be saved now.
    pub fn legacy_json(&self) -> Result<String, PetSeriesError> {
        let shape = self.with_session(|session| session.legacy_shape())?;
        Ok(shape.to_json()?)
    }

    /// Save the current patient's record and return the stored JSON.
    pub fn save(&self) -> Result<String, PetSeriesError> {
        let db = self.db.lock()?;
        let mut guard = self.session.lock()?;
        let session = guard.as_mut().ok_or(PetSeriesError::NoPatientLoaded)?;
        let shape = session.save(&db)?;
        Ok(shape.to_json()?)
    }

    /// Check if the loaded series has edits that were not saved.
    pub fn has_unsaved_changes(&self) -> Result<bool, PetSeriesError> {
        self.with_session(|session| session.is_dirty())
    }
}

impl PetSeriesCore {
    fn with_database(db: Database) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            session: Mutex::new(None),
        }
    }

    fn with_session<T>(
        &self,
        f: impl FnOnce(&mut PetSession) -> T,
    ) -> Result<T, PetSeriesError> {
        let mut guard = self.session.lock()?;
        let session = guard.as_mut().ok_or(PetSeriesError::NoPatientLoaded)?;
        Ok(f(session))
    }
}

fn parse_entry_id(raw: &str) -> Result<EntryId, PetSeriesError> {
    raw.parse()
        .map_err(|_| PetSeriesError::InvalidInput(format!("Invalid test id: {}", raw)))
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe series snapshot.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiSeries {
    pub patient_id: String,
    pub active_id: Option<String>,
    pub entries: Vec<FfiTestEntry>,
    /// Tests past the third, which the saved record cannot hold
    pub unsaved_overflow: u32,
}

impl From<&PetSession> for FfiSeries {
    fn from(session: &PetSession) -> Self {
        let series = session.series();
        Self {
            patient_id: session.patient_id().to_string(),
            active_id: series.active_id().map(|id| id.to_string()),
            entries: series.entries().iter().map(FfiTestEntry::from).collect(),
            unsaved_overflow: crate::series::unrepresentable_entries(series).len() as u32,
        }
    }
}

/// FFI-safe test entry.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiTestEntry {
    pub id: String,
    pub label: String,
    pub test_date: String,
    pub time_points: Vec<FfiTimePoint>,
    pub results: FfiDerivedResults,
}

impl From<&TestEntry> for FfiTestEntry {
    fn from(entry: &TestEntry) -> Self {
        let store = entry.measurements();
        Self {
            id: entry.id().to_string(),
            label: entry.label().to_string(),
            test_date: store.test_date().to_string(),
            time_points: store
                .time_points()
                .iter()
                .map(|(tp, readings)| FfiTimePoint {
                    key: tp.key().to_string(),
                    dialysate_creatinine: readings.dialysate_creatinine.clone(),
                    dialysate_glucose: readings.dialysate_glucose.clone(),
                    serum_creatinine: readings.serum_creatinine.clone(),
                    collects_serum_creatinine: tp.collects_serum_creatinine(),
                })
                .collect(),
            results: store.results().into(),
        }
    }
}

/// FFI-safe readings at one time point.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiTimePoint {
    pub key: String,
    pub dialysate_creatinine: String,
    pub dialysate_glucose: String,
    pub serum_creatinine: String,
    /// False for T3/T4, where the form hides serum creatinine
    pub collects_serum_creatinine: bool,
}

/// FFI-safe derived results. Empty strings mean not computable.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDerivedResults {
    pub creatinine_ratio: String,
    pub glucose_ratio: String,
    pub creatinine_class: String,
    pub glucose_class: String,
}

impl From<&DerivedResults> for FfiDerivedResults {
    fn from(results: &DerivedResults) -> Self {
        Self {
            creatinine_ratio: results.creatinine_ratio.clone(),
            glucose_ratio: results.glucose_ratio.clone(),
            creatinine_class: results
                .creatinine_class
                .map(|c| c.label().to_string())
                .unwrap_or_default(),
            glucose_class: results
                .glucose_class
                .map(|c| c.label().to_string())
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_loaded_patient() {
        let core = open_database_in_memory().unwrap();
        assert!(matches!(core.add_test(), Err(PetSeriesError::NoPatientLoaded)));
        assert!(matches!(core.save(), Err(PetSeriesError::NoPatientLoaded)));
        assert_eq!(core.current_patient().unwrap(), None);
    }

    #[test]
    fn test_edit_through_ffi() {
        let core = open_database_in_memory().unwrap();
        core.load_patient("MRN-300".into()).unwrap();

        let series = core.add_test().unwrap();
        let id = series.active_id.clone().unwrap();
        assert_eq!(series.entries[0].label, "Test 1");
        assert_eq!(series.entries[0].time_points.len(), 5);
        assert!(!series.entries[0].time_points[3].collects_serum_creatinine);

        core.update_measurement(id.clone(), "t0".into(), "dialysateGlucose".into(), "200".into())
            .unwrap();
        let series = core
            .update_measurement(id, "T4".into(), "dialysateGlucose".into(), "70".into())
            .unwrap();
        let results = &series.entries[0].results;
        assert_eq!(results.glucose_ratio, "0.350");
        assert_eq!(results.glucose_class, "High Average Transporter");
        assert_eq!(results.creatinine_class, "");
        assert!(core.has_unsaved_changes().unwrap());

        let saved: serde_json::Value = serde_json::from_str(&core.save().unwrap()).unwrap();
        assert_eq!(saved["first"]["data"]["glucoseRatio"], "0.350");
        assert!(!core.has_unsaved_changes().unwrap());
    }

    #[test]
    fn test_invalid_keys_rejected() {
        let core = open_database_in_memory().unwrap();
        let series = core.load_patient("MRN-300".into()).unwrap();
        assert!(series.entries.is_empty());
        let id = core.add_test().unwrap().active_id.unwrap();

        assert!(matches!(
            core.update_measurement(id.clone(), "t9".into(), "dialysateGlucose".into(), "1".into()),
            Err(PetSeriesError::InvalidInput(_))
        ));
        assert!(matches!(
            core.update_measurement(id, "t0".into(), "urea".into(), "1".into()),
            Err(PetSeriesError::InvalidInput(_))
        ));
        assert!(matches!(
            core.remove_test("abc".into()),
            Err(PetSeriesError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_overflow_reported() {
        let core = open_database_in_memory().unwrap();
        core.load_patient("MRN-300".into()).unwrap();
        for _ in 0..3 {
            core.add_test().unwrap();
        }
        assert_eq!(core.get_series().unwrap().unsaved_overflow, 0);
        assert_eq!(core.add_test().unwrap().unsaved_overflow, 1);
    }

    #[test]
    fn test_blank_patient_is_invalid_input() {
        let core = open_database_in_memory().unwrap();
        assert!(matches!(
            core.load_patient("  ".into()),
            Err(PetSeriesError::InvalidInput(_))
        ));
    }
}
