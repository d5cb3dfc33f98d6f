//! Clinical transport cutoffs.
//!
//! Creatinine D/P rises with transport speed; glucose D/D0 falls with it. Each cascade
//! checks its rules in order, so values between published bands fall into the next band.

use crate::models::TransportClass;

/// D/P creatinine above this is a high transporter.
pub const CREATININE_HIGH_ABOVE: f64 = 0.81;
/// Lower bound of the high average band.
pub const CREATININE_HIGH_AVERAGE_FROM: f64 = 0.65;
/// Lower bound of the low average band.
pub const CREATININE_LOW_AVERAGE_FROM: f64 = 0.50;

/// D/D0 glucose below this is a high transporter.
pub const GLUCOSE_HIGH_BELOW: f64 = 0.26;
/// Upper bound of the high average band.
pub const GLUCOSE_HIGH_AVERAGE_TO: f64 = 0.38;
/// Upper bound of the low average band.
pub const GLUCOSE_LOW_AVERAGE_TO: f64 = 0.49;

/// Classify a D/P creatinine ratio.
pub fn classify_creatinine(ratio: f64) -> TransportClass {
    if ratio > CREATININE_HIGH_ABOVE {
        TransportClass::High
    } else if ratio >= CREATININE_HIGH_AVERAGE_FROM {
        TransportClass::HighAverage
    } else if ratio >= CREATININE_LOW_AVERAGE_FROM {
        TransportClass::LowAverage
    } else {
        TransportClass::Low
    }
}

/// Classify a D/D0 glucose ratio.
pub fn classify_glucose(ratio: f64) -> TransportClass {
    if ratio < GLUCOSE_HIGH_BELOW {
        TransportClass::High
    } else if ratio <= GLUCOSE_HIGH_AVERAGE_TO {
        TransportClass::HighAverage
    } else if ratio <= GLUCOSE_LOW_AVERAGE_TO {
        TransportClass::LowAverage
    } else {
        TransportClass::Low
    }
}
