use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use cbrng::prelude::*;

fn bench_single_draw(c: &mut Criterion) {
    let mut group = c.benchmark_group("next");
    group.throughput(Throughput::Elements(1));

    let mut philox = Philox4x64Engine::seed_from_u64(1);
    group.bench_function("philox4x64", |b| {
        b.iter(|| black_box(philox.next().unwrap()))
    });

    let mut threefry = Threefry4x64Engine::seed_from_u64(1);
    group.bench_function("threefry4x64", |b| {
        b.iter(|| black_box(threefry.next().unwrap()))
    });

    let mut philox32 = Philox4x32Engine::seed_from_u64(1);
    group.bench_function("philox4x32", |b| {
        b.iter(|| black_box(philox32.next().unwrap()))
    });

    group.finish();
}

fn bench_bulk_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("fill");

    for size in [1024usize, 65536] {
        group.throughput(Throughput::Elements(size as u64));

        group.bench_with_input(BenchmarkId::new("philox4x64", size), &size, |b, &size| {
            let mut eng = Philox4x64Engine::seed_from_u64(2);
            let mut buf = vec![0u64; size];
            b.iter(|| {
                eng.fill(black_box(&mut buf)).unwrap();
                black_box(buf[size - 1])
            });
        });

        group.bench_with_input(BenchmarkId::new("threefry4x64", size), &size, |b, &size| {
            let mut eng = Threefry4x64Engine::seed_from_u64(2);
            let mut buf = vec![0u64; size];
            b.iter(|| {
                eng.fill(black_box(&mut buf)).unwrap();
                black_box(buf[size - 1])
            });
        });

        group.bench_with_input(BenchmarkId::new("threefry2x32", size), &size, |b, &size| {
            let mut eng = Threefry2x32Engine::seed_from_u64(2);
            let mut buf = vec![0u32; size];
            b.iter(|| {
                eng.fill(black_box(&mut buf)).unwrap();
                black_box(buf[size - 1])
            });
        });
    }

    group.finish();
}

fn bench_bulk_order(c: &mut Criterion) {
    let mut group = c.benchmark_group("threefry4x64_generate");
    let blocks: Vec<[u64; 8]> = (0..8192u64).map(|i| [i, 0, 0, 0, 42, 0, 0, 0]).collect();
    let mut out = vec![0u64; blocks.len() * 4];
    group.throughput(Throughput::Elements(out.len() as u64));

    group.bench_function("scalar_apply", |b| {
        b.iter(|| {
            for (block, chunk) in blocks.iter().zip(out.chunks_exact_mut(4)) {
                chunk.copy_from_slice(&Threefry4x64::<20>::apply(black_box(block)));
            }
        })
    });

    group.bench_function("in_order", |b| {
        b.iter(|| {
            Threefry4x64::<20>::generate_ordered(
                blocks.iter().copied(),
                black_box(&mut out),
                OutputOrder::InOrder,
            )
        })
    });

    group.bench_function("lane_major", |b| {
        b.iter(|| {
            Threefry4x64::<20>::generate_ordered(
                blocks.iter().copied(),
                black_box(&mut out),
                OutputOrder::LaneMajor,
            )
        })
    });

    group.finish();
}

criterion_group!(benches, bench_single_draw, bench_bulk_fill, bench_bulk_order);
criterion_main!(benches);
