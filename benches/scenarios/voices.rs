//! Benchmarks for one voice with increasing unison.

use std::{hint::black_box, sync::Arc};

use criterion::{BenchmarkId, Criterion};
use saavy_wavetable::{dsp::envelope::Adsr, Voice, Waveform, WavetableBank};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

const UNISON_SIZES: &[usize] = &[1, 4, 16];

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");
    let bank = Arc::new(WavetableBank::generate());

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for &unison in UNISON_SIZES {
            // Long sustain so the voice never frees itself mid-benchmark
            let mut voice = Voice::new(Arc::clone(&bank), SAMPLE_RATE);
            voice.set_waveform(Waveform::Sawtooth);
            voice.set_envelope(Adsr::new(0.01, 0.1, 0.8, 0.3));
            voice.set_unison_size(unison);
            voice.set_detune(0.1);
            voice.start(45, 1.0);

            let id = BenchmarkId::new(format!("saw_unison_{unison}"), size);
            group.bench_with_input(id, &size, |b, _| {
                b.iter(|| {
                    for sample in buffer.iter_mut() {
                        *sample = voice.render_sample();
                    }
                    black_box(&buffer);
                })
            });
        }
    }

    group.finish();
}
