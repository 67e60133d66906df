//! Benchmark for building the shared wavetable bank.

use std::hint::black_box;

use criterion::Criterion;
use saavy_wavetable::WavetableBank;

pub fn bench_wavetable(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/wavetable");
    group.bench_function("generate", |b| b.iter(|| black_box(WavetableBank::generate())));
    group.finish();
}
