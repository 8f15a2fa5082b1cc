//! AST container benchmarks.

use asttool_container::{
    total_container_size, AstDecoder, AstEncoder, AstEncoderConfig, AstTranscoder, AudioStream,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

fn stereo_stream(len: usize) -> AudioStream {
    let channel = |freq: f64| -> Vec<i16> {
        (0..len)
            .map(|i| {
                let t = i as f64 / 32000.0;
                (7000.0 * (2.0 * std::f64::consts::PI * freq * t).sin()) as i16
            })
            .collect()
    };
    AudioStream::new(32000, vec![channel(440.0), channel(554.37)]).unwrap()
}

fn bench_layout(c: &mut Criterion) {
    c.bench_function("total_container_size", |b| {
        b.iter(|| {
            (1..=6).fold(0usize, |acc, ch| {
                acc ^ total_container_size(black_box(1_234_567), ch)
            })
        })
    });
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("ast_encode");
    group.sample_size(10);

    let stream = stereo_stream(17_920 * 2);
    group.throughput(Throughput::Elements(stream.num_samples() as u64));

    for (name, config) in [
        ("adpcm4", AstEncoderConfig::default()),
        ("pcm16", AstEncoderConfig::pcm16()),
    ] {
        let encoder = AstEncoder::new(config);
        group.bench_with_input(BenchmarkId::from_parameter(name), &stream, |b, stream| {
            b.iter(|| encoder.encode(black_box(stream)).unwrap())
        });
    }

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let stream = stereo_stream(5_040 * 8);
    let data = AstEncoder::new(AstEncoderConfig::pcm16())
        .encode(&stream)
        .unwrap()
        .into_bytes();

    let mut group = c.benchmark_group("ast_decode");
    group.throughput(Throughput::Bytes(data.len() as u64));
    group.bench_function("pcm16", |b| {
        b.iter(|| AstDecoder::decode(black_box(&data)).unwrap())
    });
    group.finish();
}

fn bench_transcode(c: &mut Criterion) {
    let stream = stereo_stream(8_000);
    let data = AstEncoder::new(AstEncoderConfig::pcm16())
        .encode(&stream)
        .unwrap()
        .into_bytes();
    let transcoder = AstTranscoder::default();

    let mut group = c.benchmark_group("ast_transcode");
    group.sample_size(10);
    group.bench_function("pcm16_to_adpcm4", |b| {
        b.iter(|| transcoder.convert(black_box(&data)).unwrap())
    });
    group.finish();
}

criterion_group!(benches, bench_layout, bench_encode, bench_decode, bench_transcode);
criterion_main!(benches);
