// Copyright 2025 the Typeblock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::rc::Rc;

use criterion::{BatchSize, BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use typeblock_host::memory::{BlockTemplate, MemoryWorkspace};
use typeblock_host::{Check, SurfaceId, Workspace};
use typeblock_options::{
    BaseGenerator, LabelTable, OptionGenerator, OptionMatcher, SmartGenerator, SubstringMatcher,
};
use typeblock_pattern::PatternEngine;

/// A surface with the standard blocks plus `extra` synthetic types and variables.
fn surface(extra: usize) -> MemoryWorkspace {
    let mut ws = MemoryWorkspace::with_standard_blocks(SurfaceId(0));
    for i in 0..extra {
        ws.register(
            BlockTemplate::new(format!("custom_block_{i}"))
                .label(format!("custom block number {i}"))
                .value_input("VALUE", Check::any())
                .statement(),
        );
        let _ = ws.create_variable(&format!("var{i}"));
    }
    ws
}

fn bench_base_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("base_generate");
    for n in [0_usize, 50, 200] {
        let ws = surface(n);
        let labels = Rc::new(LabelTable::from_descriptors(&ws.block_types().unwrap()));
        let mut generator = BaseGenerator::new(labels);
        group.bench_function(BenchmarkId::from_parameter(n), |b| {
            b.iter(|| black_box(generator.generate_options(&ws)));
        });
    }
    group.finish();
}

fn bench_smart_keystrokes(c: &mut Criterion) {
    let mut group = c.benchmark_group("smart_keystrokes");
    let typing = ["r", "re", "rep", "repe", "repea", "repeat"];
    for n in [0_usize, 50, 200] {
        let ws = surface(n);
        let labels = Rc::new(LabelTable::from_descriptors(&ws.block_types().unwrap()));
        group.bench_function(BenchmarkId::from_parameter(n), |b| {
            b.iter_batched(
                || {
                    (
                        SmartGenerator::new(BaseGenerator::new(Rc::clone(&labels))),
                        PatternEngine::default(),
                    )
                },
                |(mut smart, mut patterns)| {
                    for input in typing {
                        black_box(smart.generate_options_for_input(&ws, &mut patterns, input))
                            .ok();
                    }
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

fn bench_substring_filter(c: &mut Criterion) {
    let ws = surface(200);
    let labels = Rc::new(LabelTable::from_descriptors(&ws.block_types().unwrap()));
    let options = BaseGenerator::new(labels).generate_options(&ws).unwrap();
    c.bench_function("substring_filter_400", |b| {
        b.iter(|| black_box(SubstringMatcher.filter(&options, black_box("Number 1"))));
    });
}

criterion_group!(
    benches,
    bench_base_generation,
    bench_smart_keystrokes,
    bench_substring_filter
);
criterion_main!(benches);
