use cellsync_proto::{build_dict, content_id, decode_value, encode_value, Value};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

fn sample_frame_dict() -> Value {
    let entries = (0..32)
        .map(|i| (Value::string(format!("field{i:02}")), Value::Int(i as i64)))
        .collect();
    build_dict(entries)
}

fn bench_encode(c: &mut Criterion) {
    let value = sample_frame_dict();
    c.bench_function("encode_32_field_dict", |b| {
        b.iter(|| black_box(encode_value(black_box(&value))));
    });
}

fn bench_decode(c: &mut Criterion) {
    let value = sample_frame_dict();
    let bytes = encode_value(&value);
    c.bench_function("decode_32_field_dict", |b| {
        b.iter(|| black_box(decode_value(black_box(&bytes)).unwrap()));
    });
}

fn bench_content_id(c: &mut Criterion) {
    let value = sample_frame_dict();
    c.bench_function("content_id_32_field_dict", |b| {
        b.iter(|| black_box(content_id(black_box(&value))));
    });
}

criterion_group!(benches, bench_encode, bench_decode, bench_content_id);
criterion_main!(benches);
