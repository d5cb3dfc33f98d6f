//! Fixed three-slot persisted shape (`first` / `second` / `third`).
//!
//! This is the JSON the record store holds per patient. Parsing is lenient: missing or
//! `null` slots are empty slots, readings may arrive as numbers, and unknown derived values
//! decode as empty (they are recomputed on load anyway).

use serde::{Deserialize, Serialize};

use super::measurement::{ReadingField, TimePoint, TimePointReadings, TimePoints};
use super::transport::{class_label, TransportClass};

/// The legacy persisted record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LegacyShape {
    #[serde(deserialize_with = "lenient::null_as_default")]
    pub first: LegacySlot,
    #[serde(deserialize_with = "lenient::null_as_default")]
    pub second: LegacySlot,
    #[serde(deserialize_with = "lenient::null_as_default")]
    pub third: LegacySlot,
}

impl LegacyShape {
    /// Number of slots the shape can hold.
    pub const SLOT_COUNT: usize = 3;

    /// All three slots empty.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from slots in position order.
    pub fn from_slots([first, second, third]: [LegacySlot; 3]) -> Self {
        Self {
            first,
            second,
            third,
        }
    }

    /// Slots in position order.
    pub fn slots(&self) -> [&LegacySlot; 3] {
        [&self.first, &self.second, &self.third]
    }

    /// True if no slot holds data.
    pub fn is_empty(&self) -> bool {
        self.slots().iter().all(|slot| slot.is_empty())
    }

    /// Parse a stored payload.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize for storage.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// One slot: `{date, data}` or `{date: "", data: null}` when empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LegacySlot {
    #[serde(deserialize_with = "lenient::string")]
    pub date: String,
    pub data: Option<MeasurementPayload>,
}

impl LegacySlot {
    /// The `{date: "", data: null}` slot.
    pub fn empty() -> Self {
        Self::default()
    }

    /// True if the slot carries no date and no readings.
    pub fn is_empty(&self) -> bool {
        self.date.trim().is_empty()
            && self
                .data
                .as_ref()
                .map_or(true, |data| data.date.trim().is_empty() && data.measurements.is_blank())
    }
}

/// Stored measurements for one slot, including derived fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct MeasurementPayload {
    #[serde(deserialize_with = "lenient::string")]
    pub date: String,
    #[serde(deserialize_with = "lenient::null_as_default")]
    pub measurements: LegacyTimePoints,
    #[serde(deserialize_with = "lenient::string")]
    pub creatinine_ratio: String,
    #[serde(deserialize_with = "lenient::string")]
    pub glucose_ratio: String,
    #[serde(with = "class_label")]
    pub creatinine_class: Option<TransportClass>,
    #[serde(with = "class_label")]
    pub glucose_class: Option<TransportClass>,
}

/// Stored readings keyed `t0`..`t4`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LegacyTimePoints {
    #[serde(deserialize_with = "lenient::null_as_default")]
    pub t0: LegacyReadings,
    #[serde(deserialize_with = "lenient::null_as_default")]
    pub t1: LegacyReadings,
    #[serde(deserialize_with = "lenient::null_as_default")]
    pub t2: LegacyReadings,
    #[serde(deserialize_with = "lenient::null_as_default")]
    pub t3: LegacyReadings,
    #[serde(deserialize_with = "lenient::null_as_default")]
    pub t4: LegacyReadings,
}

impl LegacyTimePoints {
    pub fn get(&self, time_point: TimePoint) -> &LegacyReadings {
        match time_point {
            TimePoint::T0 => &self.t0,
            TimePoint::T1 => &self.t1,
            TimePoint::T2 => &self.t2,
            TimePoint::T3 => &self.t3,
            TimePoint::T4 => &self.t4,
        }
    }

    fn get_mut(&mut self, time_point: TimePoint) -> &mut LegacyReadings {
        match time_point {
            TimePoint::T0 => &mut self.t0,
            TimePoint::T1 => &mut self.t1,
            TimePoint::T2 => &mut self.t2,
            TimePoint::T3 => &mut self.t3,
            TimePoint::T4 => &mut self.t4,
        }
    }

    pub fn is_blank(&self) -> bool {
        TimePoint::ALL.iter().all(|tp| {
            let readings = self.get(*tp);
            ReadingField::ALL
                .iter()
                .all(|field| readings.get(*field).trim().is_empty())
        })
    }
}

impl From<&TimePoints> for LegacyTimePoints {
    fn from(points: &TimePoints) -> Self {
        let mut legacy = LegacyTimePoints::default();
        for (tp, readings) in points.iter() {
            *legacy.get_mut(tp) = readings.into();
        }
        legacy
    }
}

impl From<&LegacyTimePoints> for TimePoints {
    fn from(legacy: &LegacyTimePoints) -> Self {
        let mut points = TimePoints::empty();
        for tp in TimePoint::ALL {
            let readings = legacy.get(tp);
            for field in ReadingField::ALL {
                points.set_reading(tp, field, readings.get(field).to_string());
            }
        }
        points
    }
}

/// Stored readings at one time point.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct LegacyReadings {
    #[serde(deserialize_with = "lenient::string")]
    pub dialysate_creatinine: String,
    #[serde(deserialize_with = "lenient::string")]
    pub dialysate_glucose: String,
    #[serde(deserialize_with = "lenient::string")]
    pub serum_creatinine: String,
}

impl LegacyReadings {
    pub fn get(&self, field: ReadingField) -> &str {
        match field {
            ReadingField::DialysateCreatinine => &self.dialysate_creatinine,
            ReadingField::DialysateGlucose => &self.dialysate_glucose,
            ReadingField::SerumCreatinine => &self.serum_creatinine,
        }
    }
}

impl From<&TimePointReadings> for LegacyReadings {
    fn from(readings: &TimePointReadings) -> Self {
        Self {
            dialysate_creatinine: readings.dialysate_creatinine.clone(),
            dialysate_glucose: readings.dialysate_glucose.clone(),
            serum_creatinine: readings.serum_creatinine.clone(),
        }
    }
}

/// Tolerant field decoders for stored payloads.
pub(crate) mod lenient {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Number(serde_json::Number),
        Flag(bool),
    }

    /// String, number, bool or null as a string (null becomes `""`).
    pub fn string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        let scalar: Option<Scalar> = Option::deserialize(deserializer)?;
        Ok(match scalar {
            Some(Scalar::Text(text)) => text,
            Some(Scalar::Number(number)) => number.to_string(),
            Some(Scalar::Flag(flag)) => flag.to_string(),
            None => String::new(),
        })
    }

    /// `null` decodes as the type's default.
    pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Deserialize<'de> + Default,
    {
        Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
    }
}
