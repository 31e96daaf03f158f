//! Device identity resolution.
//!
//! The agent resolves the devEUI of every uplink to an internal device
//! identifier and sensor type before decoding. Resolution is a capability
//! behind [`DeviceManagementClient`]; the decoder itself never depends on it.
//!
//! Implementations:
//! - [`StaticDeviceManagementClient`]: answers every lookup with one fixed device
//! - [`InMemoryDeviceManagementClient`]: table-backed, for tests and fixed deployments
//! - `HttpDeviceManagementClient` (feature `http`): queries the device management service

#[cfg(feature = "http")]
mod http;
mod memory;
mod stub;

#[cfg(feature = "http")]
pub use http::HttpDeviceManagementClient;
pub use memory::InMemoryDeviceManagementClient;
pub use stub::StaticDeviceManagementClient;

use serde::{Deserialize, Serialize};

use crate::Result;

/// Sensor type assumed when device management does not report one.
pub const DEFAULT_SENSOR_TYPE: &str = crate::decoder::axsensor::AXSENSOR_SENSOR_TYPE;

/// What device management knows about a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    #[serde(rename = "internalID")]
    pub internal_id: String,
    /// LwM2M object URNs the device supports
    pub types: Vec<String>,
    #[serde(rename = "sensorType", default = "default_sensor_type")]
    pub sensor_type: String,
}

fn default_sensor_type() -> String {
    DEFAULT_SENSOR_TYPE.to_string()
}

impl DeviceInfo {
    pub fn new(
        internal_id: impl Into<String>,
        types: Vec<String>,
        sensor_type: impl Into<String>,
    ) -> Self {
        Self { internal_id: internal_id.into(), types, sensor_type: sensor_type.into() }
    }

    /// Check whether the device supports an LwM2M object URN.
    pub fn supports(&self, urn: &str) -> bool {
        self.types.iter().any(|t| t == urn)
    }
}

/// Resolves device identity from a devEUI.
#[async_trait::async_trait]
pub trait DeviceManagementClient: Send + Sync + 'static {
    /// Find the device registered with `dev_eui`.
    ///
    /// Returns `DeviceLookup` if the device is unknown or the lookup failed.
    async fn find_device_from_dev_eui(&self, dev_eui: &str) -> Result<DeviceInfo>;
}
