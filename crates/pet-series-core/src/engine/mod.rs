//! Ratio and classification engine.
//!
//! Derives the D/P creatinine and D/D0 glucose ratios from a test's readings and maps
//! each to a transport category. The engine is total: incomplete or malformed readings
//! produce an empty ratio and no class, never an error.

mod classify;

pub use classify::*;

use serde::Serialize;

use crate::models::{class_label, ReadingField, TimePoint, TimePoints, TransportClass};

/// Ratios and classes derived from one test's readings.
///
/// An undefined ratio is the empty string and its class is `None`.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DerivedResults {
    /// D/P creatinine, 3 decimals
    pub creatinine_ratio: String,
    /// D/D0 glucose, 3 decimals
    pub glucose_ratio: String,
    #[serde(with = "class_label")]
    pub creatinine_class: Option<TransportClass>,
    #[serde(with = "class_label")]
    pub glucose_class: Option<TransportClass>,
}

/// Derive both ratios and their classes from the readings.
pub fn derive_results(points: &TimePoints) -> DerivedResults {
    let (creatinine_ratio, creatinine_class) = match creatinine_ratio(points) {
        Some(ratio) => (format_ratio(ratio), Some(classify_creatinine(ratio))),
        None => (String::new(), None),
    };

    let (glucose_ratio, glucose_class) = match glucose_ratio(points) {
        Some(ratio) => (format_ratio(ratio), Some(classify_glucose(ratio))),
        None => (String::new(), None),
    };

    DerivedResults {
        creatinine_ratio,
        glucose_ratio,
        creatinine_class,
        glucose_class,
    }
}

/// Dialysate creatinine at T4 over serum creatinine at T0.
pub fn creatinine_ratio(points: &TimePoints) -> Option<f64> {
    let serum = parse_reading(points.reading(TimePoint::T0, ReadingField::SerumCreatinine))?;
    let dialysate =
        parse_reading(points.reading(TimePoint::T4, ReadingField::DialysateCreatinine))?;
    ratio(dialysate, serum)
}

/// Dialysate glucose at T4 over dialysate glucose at T0.
pub fn glucose_ratio(points: &TimePoints) -> Option<f64> {
    let baseline = parse_reading(points.reading(TimePoint::T0, ReadingField::DialysateGlucose))?;
    let dwell_end = parse_reading(points.reading(TimePoint::T4, ReadingField::DialysateGlucose))?;
    ratio(dwell_end, baseline)
}

/// Parse a raw reading. Blank, unparsable and non-finite values are `None`.
pub fn parse_reading(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator <= 0.0 {
        return None;
    }
    Some(numerator / denominator).filter(|value| value.is_finite())
}

/// Stored and displayed form of a ratio. Classification uses the unrounded value.
fn format_ratio(ratio: f64) -> String {
    format!("{:.3}", ratio)
}
