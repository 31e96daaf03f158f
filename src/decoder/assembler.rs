//! Accumulates interpreted fields into one record

use crate::types::{DecodedFields, Field};

/// Builds a [`DecodedFields`] record from a stream of fields.
///
/// A later field of the same kind overwrites an earlier one.
#[derive(Debug, Default)]
pub struct PayloadAssembler {
    fields: DecodedFields,
}

impl PayloadAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply(&mut self, field: Field) {
        let fields = &mut self.fields;
        match field {
            Field::FillingLevel { percentage, level_cm } => {
                fields.filling_percentage = Some(percentage);
                fields.filling_level = Some(level_cm);
            }
            Field::Pressure(value) => fields.pressure = Some(value),
            Field::Temperature(value) => fields.temperature = Some(value),
            Field::RelativeHumidity(value) => fields.relative_humidity = Some(value),
            Field::BatteryVoltage(value) => fields.battery_voltage = Some(value),
        }
    }

    pub fn finish(self) -> DecodedFields {
        self.fields
    }
}

impl Extend<Field> for PayloadAssembler {
    fn extend<I: IntoIterator<Item = Field>>(&mut self, iter: I) {
        for field in iter {
            self.apply(field);
        }
    }
}
