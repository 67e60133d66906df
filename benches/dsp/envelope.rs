//! Benchmarks for the ADSR envelope.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_wavetable::dsp::envelope::{Adsr, Envelope};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn run(env: &mut Envelope, buffer: &mut [f32]) {
    for sample in buffer.iter_mut() {
        *sample = env.next_sample();
    }
}

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Attack phase (ramping up)
        let mut env = Envelope::with_params(SAMPLE_RATE, Adsr::new(10.0, 0.1, 0.7, 0.3));
        env.note_on();
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| run(&mut env, black_box(&mut buffer)))
        });

        // Sustain phase (holding steady)
        let mut env = Envelope::with_params(SAMPLE_RATE, Adsr::new(0.001, 0.001, 0.7, 0.3));
        env.note_on();
        for _ in 0..200 {
            env.next_sample();
        }
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| run(&mut env, black_box(&mut buffer)))
        });

        // Release phase (ramping down)
        let mut env = Envelope::with_params(SAMPLE_RATE, Adsr::new(0.001, 0.001, 0.7, 30.0));
        env.note_on();
        for _ in 0..200 {
            env.next_sample();
        }
        env.note_off();
        group.bench_with_input(BenchmarkId::new("release", size), &size, |b, _| {
            b.iter(|| run(&mut env, black_box(&mut buffer)))
        });
    }

    group.finish();
}
