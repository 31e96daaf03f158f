//! Canonical measurement objects
//!
//! Each object is unit-normalized and independent of the wire encoding it was
//! decoded from. Objects serialize to flat JSON documents carrying the device
//! identifier, the reading timestamp and the measured value(s).

use chrono::{DateTime, Utc};
use serde::Serialize;

/// LwM2M object URN for filling level sensors.
pub const FILLING_LEVEL_URN: &str = "urn:oma:lwm2m:ext:3435";
/// LwM2M object URN for pressure sensors.
pub const PRESSURE_URN: &str = "urn:oma:lwm2m:ext:3323";
/// LwM2M object URN for humidity sensors.
pub const HUMIDITY_URN: &str = "urn:oma:lwm2m:ext:3304";
/// LwM2M object URN for temperature sensors.
pub const TEMPERATURE_URN: &str = "urn:oma:lwm2m:ext:3303";
/// LwM2M object URN for the device object.
pub const DEVICE_URN: &str = "urn:oma:lwm2m:oma:3";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FillingLevel {
    #[serde(rename = "deviceID")]
    pub device_id: String,
    pub timestamp: DateTime<Utc>,
    pub filling_percentage: f64,
    #[serde(rename = "fillinglevel", skip_serializing_if = "Option::is_none")]
    pub actual_filling_level: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pressure {
    #[serde(rename = "deviceID")]
    pub device_id: String,
    pub timestamp: DateTime<Utc>,
    /// Pa
    pub pressure: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Humidity {
    #[serde(rename = "deviceID")]
    pub device_id: String,
    pub timestamp: DateTime<Utc>,
    /// %RH
    pub relative_humidity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Temperature {
    #[serde(rename = "deviceID")]
    pub device_id: String,
    pub timestamp: DateTime<Utc>,
    /// °C
    pub temperature: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    #[serde(rename = "deviceID")]
    pub device_id: String,
    pub timestamp: DateTime<Utc>,
    /// mV
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power_source_voltage: Option<i64>,
}

/// A normalized measurement record handed to downstream consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CanonicalObject {
    FillingLevel(FillingLevel),
    Pressure(Pressure),
    Humidity(Humidity),
    Temperature(Temperature),
    Device(Device),
}

impl CanonicalObject {
    /// LwM2M object URN identifying the object type.
    pub fn urn(&self) -> &'static str {
        match self {
            CanonicalObject::FillingLevel(_) => FILLING_LEVEL_URN,
            CanonicalObject::Pressure(_) => PRESSURE_URN,
            CanonicalObject::Humidity(_) => HUMIDITY_URN,
            CanonicalObject::Temperature(_) => TEMPERATURE_URN,
            CanonicalObject::Device(_) => DEVICE_URN,
        }
    }

    /// Identifier of the device the reading came from.
    pub fn device_id(&self) -> &str {
        match self {
            CanonicalObject::FillingLevel(o) => &o.device_id,
            CanonicalObject::Pressure(o) => &o.device_id,
            CanonicalObject::Humidity(o) => &o.device_id,
            CanonicalObject::Temperature(o) => &o.device_id,
            CanonicalObject::Device(o) => &o.device_id,
        }
    }

    /// Point in time of the reading.
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            CanonicalObject::FillingLevel(o) => o.timestamp,
            CanonicalObject::Pressure(o) => o.timestamp,
            CanonicalObject::Humidity(o) => o.timestamp,
            CanonicalObject::Temperature(o) => o.timestamp,
            CanonicalObject::Device(o) => o.timestamp,
        }
    }
}
