use std::time::{Duration, UNIX_EPOCH};

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use port_agent_packet::protocol::{checksum, MessageType, PacketAssembler, PacketEncoder};

fn stream_of(frames: usize, payload_size: usize) -> Vec<u8> {
    let encoder = PacketEncoder::default();
    let time = UNIX_EPOCH + Duration::from_secs(1_700_000_000);
    let payload: Vec<u8> = (0..payload_size).map(|i| (i % 251) as u8).collect();

    let mut stream = Vec::new();
    for _ in 0..frames {
        stream.push(0x00);
        stream.extend_from_slice(&encoder.encode(MessageType::DataFromInstrument, &payload, time).unwrap());
    }
    stream
}

fn benchmark_checksum(c: &mut Criterion) {
    let mut group = c.benchmark_group("checksum_compute");

    for size in [16usize, 256, 4096] {
        let frame = stream_of(1, size - 16)[1..].to_vec();
        group.bench_with_input(BenchmarkId::from_parameter(size), &frame, |b, frame| {
            b.iter(|| black_box(checksum::compute(black_box(frame))));
        });
    }

    group.finish();
}

fn benchmark_assembler(c: &mut Criterion) {
    let mut group = c.benchmark_group("assembler_feed");
    let stream = stream_of(100, 240);

    for chunk in [1usize, 64, 4096] {
        group.bench_with_input(BenchmarkId::from_parameter(chunk), &stream, |b, stream| {
            b.iter(|| {
                let mut assembler = PacketAssembler::default();
                let mut count = 0;
                for piece in stream.chunks(chunk) {
                    count += assembler.feed(piece).len();
                }
                black_box(count)
            });
        });
    }

    group.finish();
}

fn benchmark_encode(c: &mut Criterion) {
    let encoder = PacketEncoder::default();
    let payload = vec![0x55u8; 1024];
    let time = UNIX_EPOCH + Duration::from_secs(1_700_000_000);

    c.bench_function("encode_1k", |b| {
        b.iter(|| black_box(encoder.encode(MessageType::DataFromDriver, black_box(&payload), time)))
    });
}

criterion_group!(benches, benchmark_checksum, benchmark_assembler, benchmark_encode);
criterion_main!(benches);
