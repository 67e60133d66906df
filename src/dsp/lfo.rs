//! Sine LFO used to sweep the voice filter.
/*
Low Frequency Oscillators
=========================

An LFO is an oscillator running below hearing (~0.01 to ~20 Hz) whose output
moves a parameter instead of reaching the speakers. Here it wobbles the
filter cutoff:

    cutoff = base + sin(phase) * depth

The phase lives in radians, in [0, 2π). Each sample it advances by

    rate / sample_rate

so `rate` is an angular rate in radians per second. A rate of 2π makes one
full cycle per second (1 Hz); the default of 5.0 is a slow ~0.8 Hz sweep.

The phase is wrapped back into range after every step. Left unbounded, an
f32 phase would lose precision after a few minutes and the sweep would
start to stutter.
*/

use std::f32::consts::TAU;

/// Fastest accepted angular rate (≈ 20 Hz).
pub const MAX_LFO_RATE: f32 = 20.0 * TAU;

#[derive(Debug, Clone, Copy)]
pub struct Lfo {
    phase: f32,
    rate: f32,
}

impl Lfo {
    pub fn new(rate: f32) -> Self {
        Self {
            phase: 0.0,
            rate: rate.max(0.0),
        }
    }

    /// Current bipolar output, -1.0 to +1.0.
    #[inline]
    pub fn value(&self) -> f32 {
        self.phase.sin()
    }

    /// Step the phase by one sample, wrapping at 2π.
    #[inline]
    pub fn advance(&mut self, sample_rate: f32) {
        self.phase += self.rate / sample_rate;
        if self.phase >= TAU {
            self.phase = self.phase.rem_euclid(TAU);
        }
    }

    pub fn set_rate(&mut self, rate: f32) {
        self.rate = rate.max(0.0);
    }

    pub fn rate(&self) -> f32 {
        self.rate
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }
}

/// Samples needed for one LFO cycle at the given angular rate.
#[inline]
pub fn samples_per_cycle(rate: f32, sample_rate: f32) -> f32 {
    TAU * sample_rate / rate
}
