//! Decoded physical quantities

use serde::{Deserialize, Serialize};

/// One physical quantity produced by interpreting a single frame chunk.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field {
    /// Filling percentage with the derived level in centimetres
    FillingLevel { percentage: f64, level_cm: i64 },
    /// Pressure in Pa
    Pressure(f64),
    /// Temperature in °C
    Temperature(f64),
    /// Relative humidity in %RH
    RelativeHumidity(f64),
    /// Battery voltage in mV
    BatteryVoltage(f64),
}

/// Record of independently optional quantities decoded from one frame.
///
/// A field is `Some` only if its tag appeared in the frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodedFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filling_percentage: Option<f64>,
    #[serde(rename = "fillinglevel", skip_serializing_if = "Option::is_none")]
    pub filling_level: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relative_humidity: Option<f64>,
    #[serde(rename = "vbat", skip_serializing_if = "Option::is_none")]
    pub battery_voltage: Option<f64>,
}

impl DecodedFields {
    /// True when no quantity was decoded.
    pub fn is_empty(&self) -> bool {
        *self == DecodedFields::default()
    }
}
