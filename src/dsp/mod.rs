//! Low-level DSP primitives used by the voices.
//!
//! These components are allocation-free once constructed and realtime-safe,
//! so they can be embedded directly inside voice structs. They stay focused on
//! the signal-processing math; voice lifecycle and mixing live in `synth`.

/// Linear attack/decay/sustain/release envelope generator.
pub mod envelope;
/// LFO-modulated state-variable low-pass.
pub mod filter;
/// Sine LFO phase accumulator.
pub mod lfo;
/// Shared single-cycle waveform tables.
pub mod wavetable;

pub use envelope::{Adsr, EnvelopeState};
