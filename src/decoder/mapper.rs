//! Maps decoded fields to canonical objects

use chrono::{DateTime, Utc};

use crate::types::{
    CanonicalObject, DecodedFields, Device, FillingLevel, Humidity, Pressure, Temperature,
};

/// Emit one canonical object per populated field category.
///
/// Order is fixed regardless of tag order in the frame: filling level,
/// pressure, humidity, temperature, device.
pub fn to_objects(
    device_id: &str,
    fields: &DecodedFields,
    timestamp: DateTime<Utc>,
) -> Vec<CanonicalObject> {
    let mut objects = Vec::new();

    if let Some(percentage) = fields.filling_percentage {
        objects.push(CanonicalObject::FillingLevel(FillingLevel {
            device_id: device_id.to_string(),
            timestamp,
            filling_percentage: percentage,
            actual_filling_level: fields.filling_level,
        }));
    }

    if let Some(pressure) = fields.pressure {
        objects.push(CanonicalObject::Pressure(Pressure {
            device_id: device_id.to_string(),
            timestamp,
            pressure,
        }));
    }

    if let Some(humidity) = fields.relative_humidity {
        objects.push(CanonicalObject::Humidity(Humidity {
            device_id: device_id.to_string(),
            timestamp,
            relative_humidity: humidity,
        }));
    }

    if let Some(temperature) = fields.temperature {
        objects.push(CanonicalObject::Temperature(Temperature {
            device_id: device_id.to_string(),
            timestamp,
            temperature,
        }));
    }

    if let Some(millivolts) = fields.battery_voltage {
        objects.push(CanonicalObject::Device(Device {
            device_id: device_id.to_string(),
            timestamp,
            power_source_voltage: Some(millivolts as i64),
        }));
    }

    objects
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DEVICE_URN, FILLING_LEVEL_URN, HUMIDITY_URN, PRESSURE_URN, TEMPERATURE_URN};
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 3, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn empty_fields_map_to_no_objects() {
        assert!(to_objects("d", &DecodedFields::default(), ts()).is_empty());
    }

    #[test]
    fn all_fields_map_in_fixed_order() {
        let fields = DecodedFields {
            filling_percentage: Some(50.0),
            filling_level: Some(70),
            pressure: Some(101300.0),
            temperature: Some(23.5),
            relative_humidity: Some(40.0),
            battery_voltage: Some(3600.0),
        };

        let urns: Vec<_> = to_objects("d", &fields, ts()).iter().map(|o| o.urn()).collect();
        assert_eq!(
            urns,
            vec![FILLING_LEVEL_URN, PRESSURE_URN, HUMIDITY_URN, TEMPERATURE_URN, DEVICE_URN]
        );
    }

    #[test]
    fn battery_voltage_is_truncated() {
        let fields = DecodedFields { battery_voltage: Some(3599.9), ..Default::default() };
        let objects = to_objects("d", &fields, ts());
        let CanonicalObject::Device(device) = &objects[0] else {
            panic!("expected device object");
        };
        assert_eq!(device.power_source_voltage, Some(3599));
    }

    #[test]
    fn objects_carry_device_and_timestamp() {
        let fields = DecodedFields { temperature: Some(1.0), ..Default::default() };
        let objects = to_objects("internalID", &fields, ts());
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].device_id(), "internalID");
        assert_eq!(objects[0].timestamp(), ts());
    }
}
