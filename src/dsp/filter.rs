use std::f32::consts::PI;

use super::lfo::Lfo;

/*
Modulated Low-Pass
==================

Each voice runs its oscillator mix through a resonant low-pass whose cutoff
is swept by a sine LFO:

    cutoff = clamp(base + sin(lfo_phase) * depth, 20 Hz, 20 kHz)

The filter is a topology-preserving (TPT) state-variable filter. Its three
coefficients come straight from the cutoff and Q:

    g = tan(π * cutoff / sample_rate)      integrator gain (pre-warped)
    k = 1 / Q                              damping
    h = 1 / (1 + g * (g + k))              shared normalizer

Higher Q means less damping and a taller peak at the cutoff. Q is clamped to
0.1..10; at 10 the filter rings but stays stable.

Per-sample recompute
--------------------

The LFO moves the cutoff every sample, so the coefficients are rebuilt every
sample too. That costs one `tan` and one `sin` per voice per sample. Caching
is possible when depth is zero but not done here: the sweep stays
sample-accurate.

The cutoff passed to `tan` is additionally kept below Nyquist. At 44.1/48kHz
the 20 kHz ceiling already guarantees that; at low test sample rates it keeps
`g` finite.
*/

pub const MIN_CUTOFF_HZ: f32 = 20.0;
pub const MAX_CUTOFF_HZ: f32 = 20_000.0;
pub const MIN_RESONANCE: f32 = 0.1;
pub const MAX_RESONANCE: f32 = 10.0;

/// Low-pass coefficients for one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SvfCoefficients {
    /// Cutoff the coefficients were computed from (after clamping).
    pub cutoff_hz: f32,
    pub g: f32,
    pub k: f32,
    pub h: f32,
}

impl SvfCoefficients {
    pub fn lowpass(sample_rate: f32, cutoff_hz: f32, resonance: f32) -> Self {
        let cutoff_hz = cutoff_hz.clamp(MIN_CUTOFF_HZ, MAX_CUTOFF_HZ);
        let warped = cutoff_hz.min(sample_rate * 0.49);
        let g = (PI * warped / sample_rate).tan();
        let k = 1.0 / resonance.clamp(MIN_RESONANCE, MAX_RESONANCE);
        let h = 1.0 / (1.0 + g * (g + k));

        Self { cutoff_hz, g, k, h }
    }
}

/// Per-voice filter state: integrators, coefficients, LFO.
#[derive(Debug, Clone)]
pub struct ModulatedLowPass {
    ic1eq: f32,
    ic2eq: f32,
    coefficients: SvfCoefficients,
    base_cutoff: f32,
    resonance: f32,
    depth: f32,
    lfo: Lfo,
    sample_rate: f32,
}

impl ModulatedLowPass {
    pub fn new(sample_rate: f32) -> Self {
        let base_cutoff = 2_000.0;
        let resonance = 1.0;
        Self {
            ic1eq: 0.0,
            ic2eq: 0.0,
            coefficients: SvfCoefficients::lowpass(sample_rate, base_cutoff, resonance),
            base_cutoff,
            resonance,
            depth: 0.5,
            lfo: Lfo::new(5.0),
            sample_rate,
        }
    }

    /// Compute this sample's cutoff and coefficients, then step the LFO.
    #[inline]
    pub fn update_coefficients(&mut self) {
        let cutoff = self.base_cutoff + self.lfo.value() * self.depth;
        self.coefficients = SvfCoefficients::lowpass(self.sample_rate, cutoff, self.resonance);
        self.lfo.advance(self.sample_rate);
    }

    /// Filter one sample with the current coefficients.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let SvfCoefficients { g, h, .. } = self.coefficients;

        let v3 = input - self.ic2eq;
        let v1 = h * (self.ic1eq + g * v3);
        let v2 = self.ic2eq + g * v1;
        self.ic1eq = 2.0 * v1 - self.ic1eq;
        self.ic2eq = 2.0 * v2 - self.ic2eq;
        v2
    }

    pub fn set_cutoff(&mut self, cutoff_hz: f32) {
        self.base_cutoff = cutoff_hz.clamp(MIN_CUTOFF_HZ, MAX_CUTOFF_HZ);
    }

    pub fn set_resonance(&mut self, resonance: f32) {
        self.resonance = resonance.clamp(MIN_RESONANCE, MAX_RESONANCE);
    }

    pub fn set_lfo(&mut self, rate: f32, depth: f32) {
        self.lfo.set_rate(rate);
        self.depth = depth.max(0.0);
    }

    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
    }

    pub fn reset(&mut self) {
        self.ic1eq = 0.0;
        self.ic2eq = 0.0;
    }

    pub fn coefficients(&self) -> SvfCoefficients {
        self.coefficients
    }

    pub fn base_cutoff(&self) -> f32 {
        self.base_cutoff
    }

    pub fn resonance(&self) -> f32 {
        self.resonance
    }

    pub fn depth(&self) -> f32 {
        self.depth
    }

    pub fn lfo(&self) -> &Lfo {
        &self.lfo
    }
}
