// Copyright 2025 the Typeblock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{
    BatchSize, BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main,
};
use kurbo::{Point, Rect};
use typeblock_host::memory::MemoryWorkspace;
use typeblock_host::{BlockId, SurfaceId, Workspace};
use typeblock_place::{ConnectionResolver, SpatialIndex};

fn grid_index(n: u32, cell: f64) -> SpatialIndex {
    let mut index = SpatialIndex::new();
    for y in 0..n {
        for x in 0..n {
            let x0 = f64::from(x) * cell;
            let y0 = f64::from(y) * cell;
            index.insert(
                BlockId::from_raw(y * n + x, 0),
                Rect::new(x0, y0, x0 + cell * 0.8, y0 + cell * 0.5),
            );
        }
    }
    index
}

fn bench_nearest(c: &mut Criterion) {
    let mut group = c.benchmark_group("spatial_nearest");
    for n in [10_u32, 32, 100] {
        let index = grid_index(n, 60.0);
        let center = Point::new(f64::from(n) * 30.0, f64::from(n) * 30.0);
        group.throughput(Throughput::Elements(u64::from(n * n)));
        group.bench_function(BenchmarkId::from_parameter(n * n), |b| {
            b.iter(|| black_box(index.nearest(black_box(center), 200.0, 10)));
        });
    }
    group.finish();
}

/// A surface with a `n` x `n` grid of statement blocks.
fn print_grid(n: u32) -> MemoryWorkspace {
    let mut ws = MemoryWorkspace::with_standard_blocks(SurfaceId(0));
    for y in 0..n {
        for x in 0..n {
            ws.spawn("text_print", Point::new(f64::from(x) * 160.0, f64::from(y) * 80.0))
                .unwrap();
        }
    }
    ws
}

fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve_connection");
    let resolver = ConnectionResolver::default();
    for n in [5_u32, 20] {
        let drop = Point::new(f64::from(n) * 80.0, f64::from(n) * 40.0 + 10.0);
        group.bench_function(BenchmarkId::from_parameter(n * n), |b| {
            b.iter_batched(
                || {
                    let mut ws = print_grid(n);
                    let block = ws.create_block("text_print").unwrap();
                    ws.move_block(block, drop).unwrap();
                    (ws, block)
                },
                |(mut ws, block)| black_box(resolver.connect(&mut ws, block, drop)),
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_nearest, bench_resolve);
criterion_main!(benches);
