//! Device management service client over HTTP

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use super::{DeviceInfo, DeviceManagementClient};
use crate::{AgentError, Result};

/// Looks devices up with `GET {url}/{devEUI}` against the device management service.
#[derive(Debug, Clone)]
pub struct HttpDeviceManagementClient {
    url: String,
    client: Client,
}

impl HttpDeviceManagementClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(AgentError::config("device management", "service URL is empty"));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AgentError::config("device management HTTP client", e.to_string()))?;

        Ok(Self { url: url.trim_end_matches('/').to_string(), client })
    }

    /// Lookup URL for a devEUI.
    pub fn device_url(&self, dev_eui: &str) -> String {
        format!("{}/{}", self.url, dev_eui)
    }
}

#[async_trait::async_trait]
impl DeviceManagementClient for HttpDeviceManagementClient {
    async fn find_device_from_dev_eui(&self, dev_eui: &str) -> Result<DeviceInfo> {
        let url = self.device_url(dev_eui);
        debug!(dev_eui, %url, "Querying device management");

        let response = self.client.get(&url).send().await.map_err(|e| AgentError::DeviceLookup {
            dev_eui: dev_eui.to_string(),
            reason: "request failed".to_string(),
            source: Some(Box::new(e)),
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(dev_eui, status = status.as_u16(), "Device management lookup rejected");
            return Err(AgentError::device_lookup_failed(
                dev_eui,
                format!("request failed with status code {}", status.as_u16()),
            ));
        }

        response.json::<DeviceInfo>().await.map_err(|e| AgentError::DeviceLookup {
            dev_eui: dev_eui.to_string(),
            reason: "failed to parse response body".to_string(),
            source: Some(Box::new(e)),
        })
    }
}
