//! Test utilities for building sensor frames and uplink documents
//!
//! Used by unit tests and the benchmarks.

#![cfg(any(test, feature = "benchmark"))]

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, SecondsFormat, Utc};

/// Builds axsensor frames chunk by chunk.
///
/// [`build`](Self::build) pads the frame with zero bytes to twice its length
/// so that the half-buffer scan limit covers every chunk.
#[derive(Debug, Clone, Default)]
pub struct FrameBuilder {
    bytes: Vec<u8>,
}

impl FrameBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk verbatim.
    pub fn chunk(mut self, tag: u8, value: &[u8]) -> Self {
        self.bytes.push(tag);
        self.bytes.extend_from_slice(value);
        self
    }

    /// Distance below the tank top in tenths of mm (tag 0x80).
    pub fn filling_distance(self, raw: i16) -> Self {
        self.chunk(0x80, &raw.to_le_bytes())
    }

    /// Pressure in hPa (tag 0xA1).
    pub fn pressure_hpa(self, hpa: u16) -> Self {
        self.chunk(0xA1, &hpa.to_le_bytes())
    }

    /// Temperature in tenths of a degree (tag 0xA2).
    pub fn temperature_decicelsius(self, raw: u16) -> Self {
        self.chunk(0xA2, &raw.to_le_bytes())
    }

    /// Humidity in 1/1024 units (tag 0xA3).
    pub fn humidity_raw(self, raw: u16) -> Self {
        self.chunk(0xA3, &raw.to_le_bytes())
    }

    /// Battery voltage in mV (tag 0xA4).
    pub fn battery_mv(self, mv: u16) -> Self {
        self.chunk(0xA4, &mv.to_le_bytes())
    }

    /// Frame padded so the scan covers every chunk.
    pub fn build(self) -> Vec<u8> {
        let mut bytes = self.bytes;
        bytes.resize(bytes.len() * 2, 0);
        bytes
    }

    /// Frame exactly as appended.
    pub fn build_unpadded(self) -> Vec<u8> {
        self.bytes
    }
}

/// Uplink JSON document as the network server publishes it.
pub fn uplink_json(dev_eui: &str, port: u16, payload: &[u8], timestamp: DateTime<Utc>) -> Vec<u8> {
    format!(
        r#"{{"applicationID":"53","devEUI":"{}","fPort":{},"data":"{}","timestamp":"{}"}}"#,
        dev_eui,
        port,
        STANDARD.encode(payload),
        timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
    )
    .into_bytes()
}
