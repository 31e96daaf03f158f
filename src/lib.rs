//! Sensor uplink decoding for LoRaWAN field devices.
//!
//! The crate turns compact, tag-encoded binary frames into canonical,
//! unit-normalized measurement objects (LwM2M style filling level, pressure,
//! humidity, temperature and device objects).
//!
//! # Features
//!
//! - **Pure decoding**: [`decoder`] is a stateless function of port, bytes, device id and timestamp
//! - **Declarative tags**: tag meaning lives in one table, the scanner never changes
//! - **Bounds safe**: truncated frames fail with [`AgentError::FrameTruncated`], never panic
//! - **Agent shell**: [`Agent`] wires a message source, device lookup, decoders and a sink,
//!   with bounded reconnect backoff on transport failures
//!
//! # Quick Start
//!
//! ```rust
//! use chrono::Utc;
//! use iot_agent::decoder::axsensor;
//! use iot_agent::types::CanonicalObject;
//!
//! // Tag 0xA2, raw 235 -> 23.5 °C
//! let objects = axsensor::decode(2, &[0xA2, 0xEB, 0x00], "tank-7", Utc::now()).unwrap();
//! match &objects[0] {
//!     CanonicalObject::Temperature(t) => assert_eq!(t.temperature, 23.5),
//!     other => panic!("unexpected {:?}", other),
//! }
//! ```
//!
//! ## Running the agent
//!
//! ```rust,no_run
//! use iot_agent::{AgentConfig, IotAgent};
//! use iot_agent::transport::{ChannelSink, ChannelSource};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> iot_agent::Result<()> {
//!     iot_agent::logging::init_tracing("iot_agent=info");
//!     let config = AgentConfig::load("agent.yaml")?;
//!
//!     let (_publisher, source) = ChannelSource::new(64);
//!     let (sink, _batches) = ChannelSink::new(64);
//!
//!     let handle = IotAgent::from_config(&config, sink)?.spawn(source);
//!     let stats = handle.join().await?;
//!     println!("processed {} messages", stats.received);
//!     Ok(())
//! }
//! ```

// Core types and error handling
mod error;
#[cfg_attr(any(test, feature = "benchmark"), path = "test_utils.rs")]
#[cfg(any(test, feature = "benchmark"))]
pub mod test_utils;
pub mod types;

// Decoding engine
pub mod decoder;

// Agent shell
pub mod agent;
pub mod config;
pub mod device;
pub mod logging;
pub mod transport;

// Core exports
pub use error::*;
pub use types::*;

// Main API exports
pub use agent::{Agent, AgentHandle, AgentStats, ReconnectPolicy};
pub use config::AgentConfig;
pub use decoder::{DecoderRegistry, PayloadDecoder};
pub use device::{DeviceInfo, DeviceManagementClient};

use std::sync::Arc;

use tracing::info;

/// Entry point for building an agent from configuration.
pub struct IotAgent;

impl IotAgent {
    /// Build an [`Agent`] with the built-in decoders.
    ///
    /// The device management client is chosen from `device_management.url`:
    /// empty selects the static stub, otherwise the HTTP client is used
    /// (requires the `http` feature).
    ///
    /// # Errors
    ///
    /// Returns `Config` if the configuration is invalid or names a device
    /// management URL without the `http` feature.
    pub fn from_config<K>(config: &AgentConfig, sink: K) -> Result<Agent>
    where
        K: transport::ObjectSink,
    {
        config.validate()?;

        let devices = Self::device_client(config)?;
        let agent = Agent::new(devices, Arc::new(sink))
            .with_registry(DecoderRegistry::default())
            .with_reconnect_policy(config.reconnect.policy());

        info!(
            topic = %config.mqtt.topic,
            broker = %config.mqtt.broker_url(),
            "Agent configured"
        );
        Ok(agent)
    }

    fn device_client(config: &AgentConfig) -> Result<Arc<dyn DeviceManagementClient>> {
        let settings = &config.device_management;
        if settings.url.trim().is_empty() {
            info!("No device management URL configured, using static device lookup");
            return Ok(Arc::new(device::StaticDeviceManagementClient::new("")));
        }

        #[cfg(feature = "http")]
        {
            let client =
                device::HttpDeviceManagementClient::new(settings.url.clone(), settings.timeout())?;
            Ok(Arc::new(client))
        }

        #[cfg(not(feature = "http"))]
        {
            Err(AgentError::config(
                "device management",
                "a service URL requires the `http` feature",
            ))
        }
    }
}
