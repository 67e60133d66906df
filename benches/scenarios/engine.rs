//! Benchmarks for the full voice pool.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_wavetable::{dsp::envelope::Adsr, VoiceEngine, Waveform, DEFAULT_POOL_SIZE};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/engine");

    for &size in BLOCK_SIZES {
        let mut left = vec![0.0f32; size];
        let mut right = vec![0.0f32; size];

        // Idle pool: the cost floor
        let mut idle = VoiceEngine::new(DEFAULT_POOL_SIZE);
        idle.prepare(SAMPLE_RATE, size);
        group.bench_with_input(BenchmarkId::new("idle", size), &size, |b, &n| {
            b.iter(|| idle.render_block(black_box(&mut [&mut left[..], &mut right[..]]), n))
        });

        // Every voice sounding with an 8-oscillator stack
        let mut full = VoiceEngine::new(DEFAULT_POOL_SIZE);
        full.prepare(SAMPLE_RATE, size);
        full.set_waveform(Waveform::Sawtooth);
        full.set_envelope(Adsr::new(0.01, 0.1, 0.8, 0.3));
        full.set_unison_size(8);
        full.set_detune(0.08);
        for note in 0..DEFAULT_POOL_SIZE as u8 {
            full.note_on(48 + note, 1.0);
        }
        group.bench_with_input(BenchmarkId::new("full_pool_unison_8", size), &size, |b, &n| {
            b.iter(|| full.render_block(black_box(&mut [&mut left[..], &mut right[..]]), n))
        });
    }

    group.finish();
}
