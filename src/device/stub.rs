//! Fixed-answer device management client

use tracing::debug;

use super::{DeviceInfo, DeviceManagementClient};
use crate::Result;
use crate::types::TEMPERATURE_URN;

/// Answers every lookup with the same device.
///
/// Stands in for the device management service until it is reachable from
/// the deployment. The configured URL is kept for logging only.
#[derive(Debug, Clone)]
pub struct StaticDeviceManagementClient {
    url: String,
    device: DeviceInfo,
}

impl StaticDeviceManagementClient {
    /// Stub answering with the placeholder device `internalID`.
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_device(
            url,
            DeviceInfo::new("internalID", vec![TEMPERATURE_URN.to_string()], super::DEFAULT_SENSOR_TYPE),
        )
    }

    /// Stub answering with `device`.
    pub fn with_device(url: impl Into<String>, device: DeviceInfo) -> Self {
        Self { url: url.into(), device }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl DeviceManagementClient for StaticDeviceManagementClient {
    async fn find_device_from_dev_eui(&self, dev_eui: &str) -> Result<DeviceInfo> {
        debug!(dev_eui, url = %self.url, internal_id = %self.device.internal_id, "Static device lookup");
        Ok(self.device.clone())
    }
}
