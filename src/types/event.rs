//! Sensor uplink events

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{AgentError, Result};

/// One uplink from a field device, ready for payload decoding.
///
/// This is the unit of data every decoder consumes.
#[derive(Debug, Clone)]
pub struct SensorEvent {
    /// Device EUI reported by the network server
    pub dev_eui: String,

    /// Application port the frame was sent on
    pub port: u16,

    /// Raw frame bytes (shared, never mutated)
    pub payload: Arc<[u8]>,

    /// Time of the reading
    pub timestamp: DateTime<Utc>,
}

impl SensorEvent {
    /// Create a new sensor event
    pub fn new(
        dev_eui: impl Into<String>,
        port: u16,
        payload: Vec<u8>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self { dev_eui: dev_eui.into(), port, payload: payload.into(), timestamp }
    }

    /// Parse a network server uplink JSON document.
    ///
    /// `data` must be base64. When the document carries no `timestamp`,
    /// `received_at` is used instead.
    pub fn from_uplink_json(document: &[u8], received_at: DateTime<Utc>) -> Result<Self> {
        let uplink: UplinkMessage = serde_json::from_slice(document)
            .map_err(|e| AgentError::uplink(format!("invalid uplink JSON: {}", e)))?;

        let payload = match uplink.data.as_deref() {
            Some(data) => STANDARD
                .decode(data)
                .map_err(|e| AgentError::uplink(format!("invalid base64 payload: {}", e)))?,
            None => Vec::new(),
        };

        if uplink.dev_eui.trim().is_empty() {
            return Err(AgentError::uplink("uplink has an empty devEUI"));
        }

        Ok(Self::new(uplink.dev_eui, uplink.f_port, payload, uplink.timestamp.unwrap_or(received_at)))
    }
}

/// Wire shape of a network server uplink document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UplinkMessage {
    #[serde(rename = "devEUI")]
    dev_eui: String,
    f_port: u16,
    #[serde(default)]
    data: Option<String>,
    #[serde(default)]
    timestamp: Option<DateTime<Utc>>,
}
