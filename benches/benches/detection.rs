// Copyright 2025 the Typeblock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use typeblock_pattern::{PatternConfig, PatternEngine};

const INPUTS: &[&str] = &[
    "42",
    "-3.14",
    "\"hello world\"",
    "true",
    "12 * 7",
    "set total to 10",
    "set name to \"Ada\"",
    "repeat",
    "get count",
];

fn bench_detect_cold(c: &mut Criterion) {
    let mut group = c.benchmark_group("pattern_detect_cold");
    for input in INPUTS {
        group.bench_function(BenchmarkId::from_parameter(input), |b| {
            let mut engine = PatternEngine::new(PatternConfig::default());
            b.iter(|| {
                engine.clear_cache();
                black_box(engine.detect_pattern(black_box(input)))
            });
        });
    }
    group.finish();
}

fn bench_detect_cached(c: &mut Criterion) {
    let mut engine = PatternEngine::new(PatternConfig::default());
    for input in INPUTS {
        engine.detect_pattern(input);
    }
    c.bench_function("pattern_detect_cached", |b| {
        b.iter(|| {
            for input in INPUTS {
                black_box(engine.detect_pattern(black_box(input)));
            }
        });
    });
}

fn bench_suggestions(c: &mut Criterion) {
    let engine = PatternEngine::new(PatternConfig::default());
    c.bench_function("pattern_suggestions", |b| {
        b.iter(|| {
            for input in ["4", "'", "set x", "tr", "3 +"] {
                black_box(engine.get_suggestions(black_box(input)));
            }
        });
    });
}

criterion_group!(benches, bench_detect_cold, bench_detect_cached, bench_suggestions);
criterion_main!(benches);
