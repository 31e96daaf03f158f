//! Agent configuration
//!
//! Configuration is read from YAML and then overridden from the environment:
//!
//! ```yaml
//! mqtt:
//!   host: broker.example.org
//!   port: 8883
//!   username: iot-agent
//!   topic: application/53/device/#
//! device_management:
//!   url: http://device-management:8080/api/v0/devices
//!   timeout_secs: 10
//! reconnect:
//!   initial_backoff_ms: 50
//!   max_backoff_ms: 1600
//!   max_attempts: 10
//! ```
//!
//! | Variable | Overrides |
//! |---|---|
//! | `MQTT_HOST` | `mqtt.host` |
//! | `MQTT_USER` | `mqtt.username` |
//! | `MQTT_PASSWORD` | `mqtt.password` |
//! | `DEV_MGMT_URL` | `device_management.url` |

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::agent::ReconnectPolicy;
use crate::{AgentError, Result};

/// Root configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub mqtt: MqttSettings,
    pub device_management: DeviceManagementSettings,
    pub reconnect: ReconnectSettings,
}

/// Broker connection settings, consumed by the broker client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MqttSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub topic: String,
    pub client_id_prefix: String,
    pub insecure_skip_verify: bool,
}

impl Default for MqttSettings {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 8883,
            username: String::new(),
            password: String::new(),
            topic: "application/53/device/#".to_string(),
            client_id_prefix: "diwise/iot-agent".to_string(),
            insecure_skip_verify: false,
        }
    }
}

impl MqttSettings {
    /// TLS broker URL, e.g. `tls://broker:8883`.
    pub fn broker_url(&self) -> String {
        format!("tls://{}:{}", self.host, self.port)
    }

    /// Unique client id: the configured prefix followed by a random UUID.
    pub fn client_id(&self) -> String {
        format!("{}{}", self.client_id_prefix, uuid::Uuid::new_v4())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceManagementSettings {
    /// Base URL; empty selects the static stub client
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for DeviceManagementSettings {
    fn default() -> Self {
        Self { url: String::new(), timeout_secs: 10 }
    }
}

impl DeviceManagementSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectSettings {
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub max_attempts: u32,
}

impl Default for ReconnectSettings {
    fn default() -> Self {
        let policy = ReconnectPolicy::default();
        Self {
            initial_backoff_ms: policy.initial_backoff.as_millis() as u64,
            max_backoff_ms: policy.max_backoff.as_millis() as u64,
            max_attempts: policy.max_attempts,
        }
    }
}

impl ReconnectSettings {
    pub fn policy(&self) -> ReconnectPolicy {
        ReconnectPolicy {
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
            max_attempts: self.max_attempts,
        }
    }
}

impl AgentConfig {
    /// Read a YAML file and apply environment overrides.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| AgentError::file_error(path.to_path_buf(), e))?;

        let mut config = Self::from_yaml_str(&yaml)?;
        config.apply_env_overrides();
        debug!(path = %path.display(), "Loaded agent configuration");
        Ok(config)
    }

    /// Parse and validate a YAML document. No environment overrides.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml_ng::from_str(yaml)
                .map_err(|e| AgentError::config("YAML parsing", e.to_string()))?
        };
        config.validate()?;
        Ok(config)
    }

    /// Apply `MQTT_HOST`, `MQTT_USER`, `MQTT_PASSWORD` and `DEV_MGMT_URL`.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(host) = lookup("MQTT_HOST") {
            self.mqtt.host = host;
        }
        if let Some(user) = lookup("MQTT_USER") {
            self.mqtt.username = user;
        }
        if let Some(password) = lookup("MQTT_PASSWORD") {
            self.mqtt.password = password;
        }
        if let Some(url) = lookup("DEV_MGMT_URL") {
            self.device_management.url = url;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.mqtt.port == 0 {
            return Err(AgentError::config("mqtt", "port cannot be 0"));
        }
        if self.mqtt.topic.trim().is_empty() {
            return Err(AgentError::config("mqtt", "topic cannot be empty"));
        }
        if self.reconnect.max_attempts == 0 {
            return Err(AgentError::config("reconnect", "max_attempts must be at least 1"));
        }
        if self.reconnect.initial_backoff_ms > self.reconnect.max_backoff_ms {
            return Err(AgentError::config(
                "reconnect",
                "initial_backoff_ms cannot exceed max_backoff_ms",
            ));
        }
        Ok(())
    }
}
