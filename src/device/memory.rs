//! Table-backed device management client

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use super::{DeviceInfo, DeviceManagementClient};
use crate::{AgentError, Result};

/// Resolves devices from an in-memory table keyed by devEUI.
///
/// devEUIs are matched case-insensitively. Every write replaces a whole
/// entry, so a poisoned table is still consistent and stays usable.
#[derive(Debug, Default)]
pub struct InMemoryDeviceManagementClient {
    devices: RwLock<HashMap<String, DeviceInfo>>,
}

impl InMemoryDeviceManagementClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the device registered with `dev_eui`.
    pub fn insert(&self, dev_eui: &str, device: DeviceInfo) {
        self.devices
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(dev_eui.to_ascii_lowercase(), device);
    }

    pub fn len(&self) -> usize {
        self.devices.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<(String, DeviceInfo)> for InMemoryDeviceManagementClient {
    fn from_iter<I: IntoIterator<Item = (String, DeviceInfo)>>(iter: I) -> Self {
        let devices =
            iter.into_iter().map(|(dev_eui, info)| (dev_eui.to_ascii_lowercase(), info)).collect();
        Self { devices: RwLock::new(devices) }
    }
}

#[async_trait::async_trait]
impl DeviceManagementClient for InMemoryDeviceManagementClient {
    async fn find_device_from_dev_eui(&self, dev_eui: &str) -> Result<DeviceInfo> {
        let devices = self.devices.read().unwrap_or_else(PoisonError::into_inner);
        devices
            .get(&dev_eui.to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| AgentError::device_lookup_failed(dev_eui, "device not registered"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tank(id: &str) -> DeviceInfo {
        DeviceInfo::new(id, vec!["urn:oma:lwm2m:ext:3435".to_string()], "axsensor")
    }

    #[tokio::test]
    async fn finds_registered_devices_case_insensitively() {
        let client = InMemoryDeviceManagementClient::new();
        client.insert("A81758FFFE0524F2", tank("tank-1"));

        let info = client.find_device_from_dev_eui("a81758fffe0524f2").await.unwrap();
        assert_eq!(info.internal_id, "tank-1");
        assert_eq!(client.len(), 1);
    }

    #[tokio::test]
    async fn unknown_devices_fail_lookup() {
        let client = InMemoryDeviceManagementClient::new();
        assert!(client.is_empty());
        let err = client.find_device_from_dev_eui("0000").await.unwrap_err();
        assert!(matches!(err, AgentError::DeviceLookup { ref dev_eui, .. } if dev_eui == "0000"));
    }

    #[tokio::test]
    async fn poisoned_table_keeps_accepting_writes() {
        let client = InMemoryDeviceManagementClient::new();
        let poisoned = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = client.devices.write().unwrap();
            panic!("writer died");
        }));
        assert!(poisoned.is_err());
        assert!(client.devices.is_poisoned());

        client.insert("a81758fffe0524f2", tank("tank-1"));
        assert_eq!(client.len(), 1);
        let info = client.find_device_from_dev_eui("a81758fffe0524f2").await.unwrap();
        assert_eq!(info.internal_id, "tank-1");
    }

    #[tokio::test]
    async fn collects_from_pairs() {
        let client: InMemoryDeviceManagementClient =
            [("aa".to_string(), tank("a")), ("BB".to_string(), tank("b"))].into_iter().collect();
        assert_eq!(client.find_device_from_dev_eui("bb").await.unwrap().internal_id, "b");
    }
}
