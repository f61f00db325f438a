//! Criterion benchmarks for complete simulation runs.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use grove_bench::{long_profile, reference_profile};
use grove_engine::{Ecosystem, NullSink};
use grove_sync::BarrierKind;

fn bench_reference(c: &mut Criterion) {
    for (name, kind) in [
        ("reference_72_rounds_blocking", BarrierKind::Blocking),
        ("reference_72_rounds_spin", BarrierKind::Spin),
    ] {
        c.bench_function(name, |b| {
            b.iter(|| {
                let eco = Ecosystem::new(reference_profile(42, kind), Box::new(NullSink)).unwrap();
                black_box(eco.run().unwrap())
            });
        });
    }
}

fn bench_long(c: &mut Criterion) {
    let mut group = c.benchmark_group("long_run");
    group.sample_size(10);
    group.bench_function("600_rounds_blocking", |b| {
        b.iter(|| {
            let config = long_profile(50, 42, BarrierKind::Blocking);
            let eco = Ecosystem::new(config, Box::new(NullSink)).unwrap();
            black_box(eco.run().unwrap())
        });
    });
    group.finish();
}

criterion_group!(benches, bench_reference, bench_long);
criterion_main!(benches);
