//! Peritoneal membrane transport categories.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Transport type derived from a PET ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportClass {
    /// Fast solute equilibration
    High,
    HighAverage,
    LowAverage,
    /// Slow solute equilibration
    Low,
}

impl TransportClass {
    /// Clinical display label, as stored in the legacy payload.
    pub fn label(self) -> &'static str {
        match self {
            TransportClass::High => "High Transporter",
            TransportClass::HighAverage => "High Average Transporter",
            TransportClass::LowAverage => "Low Average Transporter",
            TransportClass::Low => "Low Transporter",
        }
    }

    /// Parse a display label. Anything else (including `""`) is no class.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "High Transporter" => Some(TransportClass::High),
            "High Average Transporter" => Some(TransportClass::HighAverage),
            "Low Average Transporter" => Some(TransportClass::LowAverage),
            "Low Transporter" => Some(TransportClass::Low),
            _ => None,
        }
    }
}

impl fmt::Display for TransportClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for TransportClass {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for TransportClass {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        TransportClass::from_label(&label)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown transport class: {}", label)))
    }
}

/// Serde adapter for `Option<TransportClass>` where no class is the empty string.
pub mod class_label {
    use super::TransportClass;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        class: &Option<TransportClass>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(class.map(TransportClass::label).unwrap_or(""))
    }

    /// Unknown labels, numbers and `null` decode as no class.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<TransportClass>, D::Error> {
        let label = crate::models::legacy::lenient::string(deserializer)?;
        Ok(TransportClass::from_label(&label))
    }
}
