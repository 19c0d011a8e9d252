//! Criterion micro-benchmarks for block construction, access, and casting.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use tessel_bench::{reference_block, reference_scalars, REFERENCE_LEN};
use tessel_block::{AnyBlock, Block};
use tessel_core::ElementKind;
use tessel_test_utils::fixtures;

/// Benchmark: Allocate and zero-fill 1M f64 elements.
fn bench_allocate_1m(c: &mut Criterion) {
    c.bench_function("block_allocate_1m", |b| {
        b.iter(|| {
            let block = Block::<f64>::allocate(REFERENCE_LEN).unwrap();
            black_box(block.len());
        });
    });
}

/// Benchmark: Copy 1M f64 values into a new owned block.
fn bench_from_values_1m(c: &mut Criterion) {
    let values = fixtures::random_f64s(42, REFERENCE_LEN);
    c.bench_function("block_from_values_1m", |b| {
        b.iter(|| {
            let block = Block::from_values(black_box(&values)).unwrap();
            black_box(block.len());
        });
    });
}

/// Benchmark: Build a 1M-element block from host scalars with exact coercion.
fn bench_any_from_scalars_1m(c: &mut Criterion) {
    let scalars = reference_scalars(42);
    c.bench_function("any_from_scalars_1m", |b| {
        b.iter(|| {
            let block = AnyBlock::from_values(ElementKind::Float64, black_box(&scalars)).unwrap();
            black_box(block.len());
        });
    });
}

/// Benchmark: Checked random-order get/set round trip on 1M elements.
fn bench_get_set_1m(c: &mut Criterion) {
    let block = reference_block(42);
    c.bench_function("block_get_set_1m", |b| {
        b.iter(|| {
            let mut i = 0usize;
            for _ in 0..REFERENCE_LEN {
                // An odd step visits every index of the power-of-two length.
                i = (i + 0x9E37) & (REFERENCE_LEN - 1);
                let v = block.get(i).unwrap();
                block.set(i, v + 1.0).unwrap();
            }
            black_box(block.get(0).unwrap());
        });
    });
}

/// Benchmark: Saturating f64 -> i32 and f64 -> u8 casts of 1M elements.
fn bench_cast_1m(c: &mut Criterion) {
    let block = reference_block(42);
    c.bench_function("block_cast_f64_i32_1m", |b| {
        b.iter(|| {
            let ints: Block<'_, i32> = block.cast().unwrap();
            black_box(ints.len());
        });
    });
    c.bench_function("block_cast_f64_u8_1m", |b| {
        b.iter(|| {
            let bytes: Block<'_, u8> = block.cast().unwrap();
            black_box(bytes.len());
        });
    });
}

criterion_group!(
    benches,
    bench_allocate_1m,
    bench_from_values_1m,
    bench_any_from_scalars_1m,
    bench_get_set_1m,
    bench_cast_1m
);
criterion_main!(benches);
