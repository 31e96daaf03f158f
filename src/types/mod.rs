//! Core types for sensor payload decoding.
//!
//! ## Architecture
//!
//! - [`SensorEvent`] is one uplink: port, raw frame bytes, device EUI and timestamp
//! - [`LengthClass`] classifies a tag byte into the number of bytes its chunk occupies
//! - [`Field`] is one interpreted quantity, [`DecodedFields`] the record assembled from a frame
//! - [`CanonicalObject`] is the unit-normalized output handed downstream
//!
//! ## Usage Example
//!
//! ```rust
//! use iot_agent::types::LengthClass;
//!
//! assert_eq!(LengthClass::of(0x3F).size(), 1);
//! assert_eq!(LengthClass::of(0x40).size(), 2);
//! assert_eq!(LengthClass::of(0xA2).size(), 3);
//! assert_eq!(LengthClass::of(0xC0).size(), 5);
//! ```

mod event;
mod fields;
mod length_class;
mod objects;

pub use event::SensorEvent;
pub use fields::{DecodedFields, Field};
pub use length_class::LengthClass;
pub use objects::{
    CanonicalObject, DEVICE_URN, Device, FILLING_LEVEL_URN, FillingLevel, HUMIDITY_URN, Humidity,
    PRESSURE_URN, Pressure, TEMPERATURE_URN, Temperature,
};
