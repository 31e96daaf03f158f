//! Payload decoding engine.
//!
//! Decoding is a single pass with no feedback between stages:
//!
//! ```text
//! bytes ─► FrameReader ─► interpreter ─► PayloadAssembler ─► mapper ─► objects
//! ```
//!
//! - [`FrameReader`] splits the frame into `(tag, value)` chunks by length class
//! - [`interpreter`] turns a chunk into a physical quantity using a declarative tag table
//! - [`PayloadAssembler`] collects quantities, last write wins
//! - [`mapper`] emits canonical objects in a fixed order
//!
//! Decoders are pure: they hold no state and perform no I/O, so a single
//! instance can be shared between tasks.
//!
//! # Example
//!
//! ```rust
//! use chrono::Utc;
//! use iot_agent::decoder::{DecoderRegistry, PayloadDecoder};
//! use iot_agent::types::SensorEvent;
//!
//! let registry = DecoderRegistry::default();
//! let decoder = registry.get("axsensor").unwrap();
//!
//! let event = SensorEvent::new("a81758fffe0524f2", 2, vec![0xA2, 0xEB, 0x00], Utc::now());
//! let objects = decoder.decode("internalID", &event).unwrap();
//! assert_eq!(objects.len(), 1);
//! ```

mod assembler;
pub mod axsensor;
pub mod interpreter;
pub mod mapper;
mod reader;

use std::collections::HashMap;
use std::sync::Arc;

pub use assembler::PayloadAssembler;
pub use axsensor::AxsensorDecoder;
pub use reader::{Chunk, FrameReader};

use crate::types::{CanonicalObject, SensorEvent};
use crate::{AgentError, Result};

/// Converts the payload of one sensor event into canonical objects.
pub trait PayloadDecoder: Send + Sync {
    /// Sensor type this decoder handles.
    fn sensor_type(&self) -> &'static str;

    /// Decode an event on behalf of `device_id`.
    ///
    /// Errors are final: the same event always fails the same way.
    fn decode(&self, device_id: &str, event: &SensorEvent) -> Result<Vec<CanonicalObject>>;
}

/// Lookup of payload decoders by sensor type.
#[derive(Clone)]
pub struct DecoderRegistry {
    decoders: HashMap<String, Arc<dyn PayloadDecoder>>,
}

impl DecoderRegistry {
    /// Registry with no decoders.
    pub fn empty() -> Self {
        Self { decoders: HashMap::new() }
    }

    /// Register a decoder under its sensor type, replacing any previous one.
    pub fn register(&mut self, decoder: Arc<dyn PayloadDecoder>) {
        self.decoders.insert(decoder.sensor_type().to_string(), decoder);
    }

    pub fn get(&self, sensor_type: &str) -> Option<Arc<dyn PayloadDecoder>> {
        self.decoders.get(sensor_type).cloned()
    }

    /// Like [`get`](Self::get) but fails with `UnknownSensorType`.
    pub fn require(&self, sensor_type: &str) -> Result<Arc<dyn PayloadDecoder>> {
        self.get(sensor_type).ok_or_else(|| AgentError::UnknownSensorType {
            sensor_type: sensor_type.to_string(),
        })
    }

    pub fn sensor_types(&self) -> Vec<String> {
        let mut types: Vec<_> = self.decoders.keys().cloned().collect();
        types.sort();
        types
    }
}

impl Default for DecoderRegistry {
    /// Registry with every built-in decoder.
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(AxsensorDecoder));
        registry
    }
}

impl std::fmt::Debug for DecoderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecoderRegistry").field("sensor_types", &self.sensor_types()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullDecoder;

    impl PayloadDecoder for NullDecoder {
        fn sensor_type(&self) -> &'static str {
            "null"
        }

        fn decode(&self, _device_id: &str, _event: &SensorEvent) -> Result<Vec<CanonicalObject>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn default_registry_has_axsensor() {
        let registry = DecoderRegistry::default();
        assert!(registry.get("axsensor").is_some());
        assert_eq!(registry.sensor_types(), vec!["axsensor".to_string()]);
    }

    #[test]
    fn require_reports_unknown_types() {
        let registry = DecoderRegistry::empty();
        let err = registry.require("axsensor").err().unwrap();
        assert!(matches!(err, AgentError::UnknownSensorType { ref sensor_type } if sensor_type == "axsensor"));
    }

    #[test]
    fn register_adds_custom_decoders() {
        let mut registry = DecoderRegistry::default();
        registry.register(Arc::new(NullDecoder));
        assert_eq!(registry.sensor_types(), vec!["axsensor".to_string(), "null".to_string()]);
        assert_eq!(registry.require("null").unwrap().sensor_type(), "null");
    }

    #[test]
    fn registry_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<DecoderRegistry>();
    }
}
