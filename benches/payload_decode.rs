//! Benchmarks for axsensor payload decoding
//!
//! Covers:
//! - Full five-tag frames through the complete pipeline
//! - Chunk scanning alone, without interpretation
//! - Uplink JSON parsing (base64 payload extraction)
//!
//! Platform: Cross-platform, synthetic frames only

use chrono::{TimeZone, Utc};
use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use iot_agent::SensorEvent;
use iot_agent::decoder::{FrameReader, axsensor};
use iot_agent::test_utils::{FrameBuilder, uplink_json};
use std::hint::black_box;

fn full_frame() -> Vec<u8> {
    FrameBuilder::new()
        .filling_distance(4725)
        .pressure_hpa(1013)
        .temperature_decicelsius(235)
        .humidity_raw(512)
        .battery_mv(3600)
        .build()
}

fn bench_decode(c: &mut Criterion) {
    let frame = full_frame();
    let timestamp = Utc.with_ymd_and_hms(2022, 3, 1, 10, 0, 0).unwrap();

    let mut group = c.benchmark_group("axsensor_decode");
    group.throughput(Throughput::Bytes(frame.len() as u64));

    group.bench_function("full_frame", |b| {
        b.iter(|| {
            let objects = axsensor::decode(
                black_box(axsensor::AXSENSOR_PORT),
                black_box(&frame),
                black_box("internalID"),
                timestamp,
            )
            .expect("decode failed");
            black_box(objects)
        })
    });

    group.bench_function("fields_only", |b| {
        b.iter(|| black_box(axsensor::decode_fields(black_box(&frame)).expect("decode failed")))
    });

    group.finish();
}

fn bench_scan(c: &mut Criterion) {
    // 128 temperature chunks followed by matching padding
    let frame = (0..128)
        .fold(FrameBuilder::new(), |builder, i| builder.temperature_decicelsius(i as u16))
        .build();

    let mut group = c.benchmark_group("frame_scan");
    group.throughput(Throughput::Bytes(frame.len() as u64));

    group.bench_function("chunks_128", |b| {
        b.iter(|| {
            let count = FrameReader::new(black_box(&frame)).filter(|chunk| chunk.is_ok()).count();
            black_box(count)
        })
    });

    group.finish();
}

fn bench_uplink_parsing(c: &mut Criterion) {
    let timestamp = Utc.with_ymd_and_hms(2022, 3, 1, 10, 0, 0).unwrap();
    let document = uplink_json("a81758fffe0524f2", 2, &full_frame(), timestamp);

    c.bench_function("uplink_json_parse", |b| {
        b.iter(|| {
            let event = SensorEvent::from_uplink_json(black_box(&document), timestamp)
                .expect("parse failed");
            black_box(event)
        })
    });
}

criterion_group!(benches, bench_decode, bench_scan, bench_uplink_parsing);
criterion_main!(benches);
