//! Adapters between [`TestSeries`] and the three-slot [`LegacyShape`].

use tracing::{debug, warn};

use super::{TestEntry, TestSeries};
use crate::models::{LegacyShape, LegacySlot, MeasurementPayload, MeasurementStore, TimePoints};

/// Seed a series from a stored record.
///
/// Empty slots produce no entry, so later slots move up. Stored ratios and classes are
/// discarded and recomputed from the readings. The first entry is active.
pub fn seed_from_legacy(shape: &LegacyShape) -> TestSeries {
    let stores: Vec<MeasurementStore> = shape
        .slots()
        .into_iter()
        .filter(|slot| !slot.is_empty())
        .map(store_from_slot)
        .collect();

    debug!(entries = stores.len(), "seeded PET series from legacy record");
    TestSeries::from_stores(stores)
}

/// Emit the first three entries as a legacy record. Missing positions are empty slots.
///
/// Entries past the third have no slot and are left out.
pub fn to_legacy_shape(series: &TestSeries) -> LegacyShape {
    let overflow = series.len().saturating_sub(LegacyShape::SLOT_COUNT);
    if overflow > 0 {
        warn!(
            entries = series.len(),
            dropped = overflow,
            "PET series has more tests than the legacy record can hold"
        );
    }

    let mut entries = series.entries().iter();
    let mut next_slot = || entries.next().map(slot_from_entry).unwrap_or_default();
    let first = next_slot();
    let second = next_slot();
    let third = next_slot();
    LegacyShape::from_slots([first, second, third])
}

/// Entries that [`to_legacy_shape`] cannot represent.
pub fn unrepresentable_entries(series: &TestSeries) -> &[TestEntry] {
    series
        .entries()
        .get(LegacyShape::SLOT_COUNT..)
        .unwrap_or_default()
}

fn store_from_slot(slot: &LegacySlot) -> MeasurementStore {
    let data = slot.data.as_ref();
    let date = if slot.date.trim().is_empty() {
        data.map(|data| data.date.as_str()).unwrap_or_default()
    } else {
        slot.date.as_str()
    };
    let time_points = data
        .map(|data| TimePoints::from(&data.measurements))
        .unwrap_or_default();
    MeasurementStore::new(date, time_points)
}

fn slot_from_entry(entry: &TestEntry) -> LegacySlot {
    let store = entry.measurements();
    let results = store.results();
    LegacySlot {
        date: store.test_date().to_string(),
        data: Some(MeasurementPayload {
            date: store.test_date().to_string(),
            measurements: store.time_points().into(),
            creatinine_ratio: results.creatinine_ratio.clone(),
            glucose_ratio: results.glucose_ratio.clone(),
            creatinine_class: results.creatinine_class,
            glucose_class: results.glucose_class,
        }),
    }
}
