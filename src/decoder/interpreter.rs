//! Per-tag physical quantity interpreters
//!
//! The tag table is the only place that knows what a tag means. Adding a tag
//! is one [`TagRule`] entry; the scanner never changes.

use crate::types::{Field, LengthClass};

/// Full-scale tank height in mm.
const TANK_HEIGHT_MM: i16 = 1400;

/// Decimal places kept on the filling percentage.
const PERCENTAGE_PRECISION: i32 = 5;

/// Decode behavior bound to one tag value.
#[derive(Debug, Clone, Copy)]
pub struct TagRule {
    pub tag: u8,
    pub name: &'static str,
    pub length_class: LengthClass,
    interpret: fn([u8; 2]) -> Field,
}

impl TagRule {
    const fn new(tag: u8, name: &'static str, interpret: fn([u8; 2]) -> Field) -> Self {
        Self { tag, name, length_class: LengthClass::of(tag), interpret }
    }

    /// Apply the rule to a chunk value.
    ///
    /// Returns `None` if `value` is shorter than the rule's value length.
    pub fn interpret(&self, value: &[u8]) -> Option<Field> {
        value.first_chunk::<2>().map(|pair| (self.interpret)(*pair))
    }
}

/// Known tags of the axsensor frame format.
pub const AXSENSOR_TAGS: &[TagRule] = &[
    TagRule::new(0x80, "filling level", filling_level),
    TagRule::new(0xA1, "pressure", pressure),
    TagRule::new(0xA2, "temperature", temperature),
    TagRule::new(0xA3, "relative humidity", relative_humidity),
    TagRule::new(0xA4, "battery voltage", battery_voltage),
];

/// Look up the rule for a tag.
pub fn rule_for(tag: u8) -> Option<&'static TagRule> {
    AXSENSOR_TAGS.iter().find(|rule| rule.tag == tag)
}

/// Interpret one chunk.
///
/// Unknown tags and values too short for the tag's rule yield `None`.
pub fn interpret(tag: u8, value: &[u8]) -> Option<Field> {
    rule_for(tag).and_then(|rule| rule.interpret(value))
}

/// Distance reading in tenths of mm below the tank top.
///
/// The height division is integer division on the raw 16-bit value. The
/// percentage is rounded, the centimetre level is truncated.
fn filling_level(value: [u8; 2]) -> Field {
    let raw = i16::from_le_bytes(value);
    let height = f64::from(TANK_HEIGHT_MM - raw / 10);

    let percentage = round_to(height * 100.0 / f64::from(TANK_HEIGHT_MM), PERCENTAGE_PRECISION);
    let level_cm = ((height + 5.0) / 10.0) as i64;

    Field::FillingLevel { percentage, level_cm }
}

fn pressure([low, high]: [u8; 2]) -> Field {
    Field::Pressure((f64::from(low) + f64::from(high) * 256.0) * 100.0)
}

fn temperature(value: [u8; 2]) -> Field {
    Field::Temperature(f64::from(u16::from_le_bytes(value)) / 10.0)
}

fn relative_humidity([low, high]: [u8; 2]) -> Field {
    Field::RelativeHumidity((f64::from(low) + f64::from(high) * 256.0) / 1024.0 * 100.0)
}

fn battery_voltage(value: [u8; 2]) -> Field {
    Field::BatteryVoltage(f64::from(u16::from_le_bytes(value)))
}

/// Round half away from zero to `precision` decimal places.
fn round_to(value: f64, precision: i32) -> f64 {
    let ratio = 10f64.powi(precision);
    (value * ratio).round() / ratio
}
