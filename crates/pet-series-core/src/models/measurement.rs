//! Raw PET readings for a single test instance.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::engine::{derive_results, DerivedResults};

/// One of the five fixed PET sampling instants.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimePoint {
    T0,
    T1,
    T2,
    T3,
    T4,
}

impl TimePoint {
    /// All time points in sampling order.
    pub const ALL: [TimePoint; 5] = [
        TimePoint::T0,
        TimePoint::T1,
        TimePoint::T2,
        TimePoint::T3,
        TimePoint::T4,
    ];

    /// Wire key used in the legacy payload (`t0`..`t4`).
    pub fn key(self) -> &'static str {
        match self {
            TimePoint::T0 => "t0",
            TimePoint::T1 => "t1",
            TimePoint::T2 => "t2",
            TimePoint::T3 => "t3",
            TimePoint::T4 => "t4",
        }
    }

    /// Parse a wire key, case-insensitively.
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim().to_lowercase().as_str() {
            "t0" => Some(TimePoint::T0),
            "t1" => Some(TimePoint::T1),
            "t2" => Some(TimePoint::T2),
            "t3" => Some(TimePoint::T3),
            "t4" => Some(TimePoint::T4),
            _ => None,
        }
    }

    /// Serum creatinine is only drawn at T0-T2. Storage still reserves the field.
    pub fn collects_serum_creatinine(self) -> bool {
        matches!(self, TimePoint::T0 | TimePoint::T1 | TimePoint::T2)
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// A single reading slot within a time point.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ReadingField {
    DialysateCreatinine,
    DialysateGlucose,
    SerumCreatinine,
}

impl ReadingField {
    pub const ALL: [ReadingField; 3] = [
        ReadingField::DialysateCreatinine,
        ReadingField::DialysateGlucose,
        ReadingField::SerumCreatinine,
    ];

    /// Wire name used in the legacy payload.
    pub fn key(self) -> &'static str {
        match self {
            ReadingField::DialysateCreatinine => "dialysateCreatinine",
            ReadingField::DialysateGlucose => "dialysateGlucose",
            ReadingField::SerumCreatinine => "serumCreatinine",
        }
    }

    /// Parse a wire name. Snake case is accepted as well.
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim() {
            "dialysateCreatinine" | "dialysate_creatinine" => {
                Some(ReadingField::DialysateCreatinine)
            }
            "dialysateGlucose" | "dialysate_glucose" => Some(ReadingField::DialysateGlucose),
            "serumCreatinine" | "serum_creatinine" => Some(ReadingField::SerumCreatinine),
            _ => None,
        }
    }
}

/// The three raw readings at one time point, kept as entered.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TimePointReadings {
    /// Dialysate creatinine
    pub dialysate_creatinine: String,
    /// Dialysate glucose
    pub dialysate_glucose: String,
    /// Serum creatinine (collected at T0-T2 only)
    pub serum_creatinine: String,
}

impl TimePointReadings {
    /// Get a reading by field.
    pub fn get(&self, field: ReadingField) -> &str {
        match field {
            ReadingField::DialysateCreatinine => &self.dialysate_creatinine,
            ReadingField::DialysateGlucose => &self.dialysate_glucose,
            ReadingField::SerumCreatinine => &self.serum_creatinine,
        }
    }

    /// Overwrite a reading.
    pub fn set(&mut self, field: ReadingField, value: String) {
        match field {
            ReadingField::DialysateCreatinine => self.dialysate_creatinine = value,
            ReadingField::DialysateGlucose => self.dialysate_glucose = value,
            ReadingField::SerumCreatinine => self.serum_creatinine = value,
        }
    }

    /// True if every reading is blank.
    pub fn is_blank(&self) -> bool {
        ReadingField::ALL
            .iter()
            .all(|field| self.get(*field).trim().is_empty())
    }
}

/// Readings for T0 through T4.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TimePoints {
    points: [TimePointReadings; 5],
}

impl TimePoints {
    /// All readings empty.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self, time_point: TimePoint) -> &TimePointReadings {
        &self.points[time_point.index()]
    }

    /// Raw string for one reading.
    pub fn reading(&self, time_point: TimePoint, field: ReadingField) -> &str {
        self.get(time_point).get(field)
    }

    /// Overwrite one reading. Derived results are not touched here.
    pub fn set_reading(&mut self, time_point: TimePoint, field: ReadingField, value: String) {
        self.points[time_point.index()].set(field, value);
    }

    /// Builder form of [`TimePoints::set_reading`].
    pub fn with_reading(
        mut self,
        time_point: TimePoint,
        field: ReadingField,
        value: impl Into<String>,
    ) -> Self {
        self.set_reading(time_point, field, value.into());
        self
    }

    /// Iterate time points in sampling order.
    pub fn iter(&self) -> impl Iterator<Item = (TimePoint, &TimePointReadings)> {
        TimePoint::ALL.into_iter().zip(self.points.iter())
    }

    /// True if no reading at any time point holds a value.
    pub fn is_blank(&self) -> bool {
        self.points.iter().all(TimePointReadings::is_blank)
    }
}

/// Measurements and derived results for one PET.
///
/// Derived results are private and recomputed on every reading change, so they always
/// agree with the current time points.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MeasurementStore {
    test_date: String,
    time_points: TimePoints,
    results: DerivedResults,
}

impl Default for MeasurementStore {
    fn default() -> Self {
        Self::empty()
    }
}

impl MeasurementStore {
    /// Build a store, deriving results from the given readings.
    pub fn new(test_date: impl Into<String>, time_points: TimePoints) -> Self {
        let results = derive_results(&time_points);
        Self {
            test_date: test_date.into(),
            time_points,
            results,
        }
    }

    /// Every reading and derived field empty, no date.
    pub fn empty() -> Self {
        Self {
            test_date: String::new(),
            time_points: TimePoints::empty(),
            results: DerivedResults::default(),
        }
    }

    pub fn test_date(&self) -> &str {
        &self.test_date
    }

    /// Test date as a calendar date, if it is ISO-8601 (`2024-03-01`, or an RFC 3339
    /// timestamp whose date part is used).
    pub fn parsed_test_date(&self) -> Option<NaiveDate> {
        let raw = self.test_date.trim();
        let date_part = raw.get(..10).unwrap_or(raw);
        NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
    }

    pub fn time_points(&self) -> &TimePoints {
        &self.time_points
    }

    pub fn results(&self) -> &DerivedResults {
        &self.results
    }

    /// Set one reading and recompute all derived results.
    pub fn update_reading(&mut self, time_point: TimePoint, field: ReadingField, value: String) {
        self.time_points.set_reading(time_point, field, value);
        self.results = derive_results(&self.time_points);
    }

    /// Change the test date. The date does not feed the engine.
    pub fn set_test_date(&mut self, date: impl Into<String>) {
        self.test_date = date.into();
    }

    /// True if the store carries a date or at least one reading.
    pub fn has_content(&self) -> bool {
        !self.test_date.trim().is_empty() || !self.time_points.is_blank()
    }
}
