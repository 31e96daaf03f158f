//! Axsensor tank level sensor decoder

use chrono::{DateTime, Utc};
use tracing::{debug, trace};

use super::PayloadDecoder;
use super::assembler::PayloadAssembler;
use super::interpreter;
use super::mapper;
use super::reader::FrameReader;
use crate::types::{CanonicalObject, DecodedFields, SensorEvent};
use crate::{AgentError, Result};

/// Application port axsensor frames are sent on.
pub const AXSENSOR_PORT: u16 = 2;

/// Sensor type name the decoder is registered under.
pub const AXSENSOR_SENSOR_TYPE: &str = "axsensor";

/// Decoder for axsensor frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct AxsensorDecoder;

impl PayloadDecoder for AxsensorDecoder {
    fn sensor_type(&self) -> &'static str {
        AXSENSOR_SENSOR_TYPE
    }

    fn decode(&self, device_id: &str, event: &SensorEvent) -> Result<Vec<CanonicalObject>> {
        decode(event.port, &event.payload, device_id, event.timestamp)
    }
}

/// Decode one axsensor frame into canonical objects.
///
/// Fails with `InvalidPort` unless `port` is [`AXSENSOR_PORT`], and with
/// `FrameTruncated` if a chunk overruns the buffer. No partial results are
/// returned on error.
pub fn decode(
    port: u16,
    payload: &[u8],
    device_id: &str,
    timestamp: DateTime<Utc>,
) -> Result<Vec<CanonicalObject>> {
    if port != AXSENSOR_PORT {
        return Err(AgentError::InvalidPort { expected: AXSENSOR_PORT, found: port });
    }

    let fields = decode_fields(payload)?;
    let objects = mapper::to_objects(device_id, &fields, timestamp);

    debug!(device_id, bytes = payload.len(), objects = objects.len(), "Decoded axsensor frame");
    Ok(objects)
}

/// Scan and interpret a frame without mapping it.
pub fn decode_fields(payload: &[u8]) -> Result<DecodedFields> {
    let mut assembler = PayloadAssembler::new();

    for chunk in FrameReader::new(payload) {
        let chunk = chunk?;
        match interpreter::interpret(chunk.tag, chunk.value) {
            Some(field) => assembler.apply(field),
            None => trace!(tag = chunk.tag, offset = chunk.offset, "Skipping unrecognized chunk"),
        }
    }

    Ok(assembler.finish())
}
