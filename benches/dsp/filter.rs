//! Benchmarks for the LFO-modulated state-variable low-pass.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_wavetable::dsp::filter::ModulatedLowPass;

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        // Sawtooth-like ramp
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();
        let mut buffer = input.clone();

        // Static cutoff: coefficients still recomputed every sample
        let mut filter = ModulatedLowPass::new(SAMPLE_RATE);
        filter.set_cutoff(1_000.0);
        filter.set_resonance(0.7);
        filter.set_lfo(0.0, 0.0);
        group.bench_with_input(BenchmarkId::new("static", size), &size, |b, _| {
            b.iter(|| {
                for (out, &x) in buffer.iter_mut().zip(&input) {
                    filter.update_coefficients();
                    *out = filter.process(black_box(x));
                }
            })
        });

        // Deep, fast sweep
        let mut filter = ModulatedLowPass::new(SAMPLE_RATE);
        filter.set_cutoff(2_000.0);
        filter.set_resonance(4.0);
        filter.set_lfo(30.0, 1_500.0);
        group.bench_with_input(BenchmarkId::new("swept", size), &size, |b, _| {
            b.iter(|| {
                for (out, &x) in buffer.iter_mut().zip(&input) {
                    filter.update_coefficients();
                    *out = filter.process(black_box(x));
                }
            })
        });
    }

    group.finish();
}
