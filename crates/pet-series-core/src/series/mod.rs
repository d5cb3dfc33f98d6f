//! PET series: an ordered list of tests with one active entry.
//!
//! The collection knows nothing about the three-slot legacy record; conversion lives in
//! [`legacy`] and is the only place the slot limit appears.

mod legacy;

pub use legacy::*;

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::models::{MeasurementStore, ReadingField, TimePoint};

/// Stable identifier of a test entry, independent of its position.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct EntryId(uuid::Uuid);

impl EntryId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for EntryId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::parse_str(s.trim()).map(EntryId)
    }
}

/// One test in the series.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TestEntry {
    id: EntryId,
    label: String,
    measurements: MeasurementStore,
}

impl TestEntry {
    fn new(measurements: MeasurementStore) -> Self {
        Self {
            id: EntryId::new(),
            label: String::new(),
            measurements,
        }
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    /// `"Test N"` for 1-based position N.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn measurements(&self) -> &MeasurementStore {
        &self.measurements
    }
}

/// Display label for a 0-based position.
pub fn position_label(index: usize) -> String {
    format!("Test {}", index + 1)
}

/// Ordered tests plus the entry being edited.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct TestSeries {
    entries: Vec<TestEntry>,
    active_id: Option<EntryId>,
}

impl TestSeries {
    /// An empty series with nothing active.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a series from stores in order. The first entry becomes active.
    pub fn from_stores(stores: impl IntoIterator<Item = MeasurementStore>) -> Self {
        let entries: Vec<TestEntry> = stores.into_iter().map(TestEntry::new).collect();
        let active_id = entries.first().map(TestEntry::id);
        let mut series = Self { entries, active_id };
        series.relabel();
        series
    }

    pub fn entries(&self) -> &[TestEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: EntryId) -> Option<&TestEntry> {
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// 0-based position of an entry.
    pub fn position(&self, id: EntryId) -> Option<usize> {
        self.entries.iter().position(|entry| entry.id == id)
    }

    pub fn active_id(&self) -> Option<EntryId> {
        self.active_id
    }

    pub fn active_entry(&self) -> Option<&TestEntry> {
        self.active_id.and_then(|id| self.get(id))
    }

    /// Append an empty test and make it active.
    pub fn add_entry(&mut self) -> EntryId {
        let entry = TestEntry::new(MeasurementStore::empty());
        let id = entry.id;
        self.entries.push(entry);
        self.relabel();
        self.active_id = Some(id);
        id
    }

    /// Remove a test. If it was active, focus moves to its predecessor, or to the new first
    /// entry when it had none. Unknown ids are ignored.
    pub fn remove_entry(&mut self, id: EntryId) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };

        self.entries.remove(index);
        self.relabel();

        if self.active_id == Some(id) {
            let next = index.saturating_sub(1);
            self.active_id = self.entries.get(next).map(TestEntry::id);
        }
        true
    }

    /// Make an entry active. Unknown ids leave the selection unchanged.
    pub fn set_active(&mut self, id: EntryId) -> bool {
        if self.position(id).is_none() {
            return false;
        }
        self.active_id = Some(id);
        true
    }

    /// Set one reading on an entry and recompute its derived results.
    pub fn update_measurement(
        &mut self,
        id: EntryId,
        time_point: TimePoint,
        field: ReadingField,
        value: impl Into<String>,
    ) -> bool {
        match self.entry_mut(id) {
            Some(entry) => {
                entry
                    .measurements
                    .update_reading(time_point, field, value.into());
                true
            }
            None => false,
        }
    }

    /// Set an entry's test date.
    pub fn update_test_date(&mut self, id: EntryId, date: impl Into<String>) -> bool {
        match self.entry_mut(id) {
            Some(entry) => {
                entry.measurements.set_test_date(date);
                true
            }
            None => false,
        }
    }

    fn entry_mut(&mut self, id: EntryId) -> Option<&mut TestEntry> {
        self.entries.iter_mut().find(|entry| entry.id == id)
    }

    fn relabel(&mut self) {
        for (index, entry) in self.entries.iter_mut().enumerate() {
            entry.label = position_label(index);
        }
    }
}
