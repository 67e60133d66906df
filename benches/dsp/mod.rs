//! Benchmarks for low-level DSP primitives.

mod envelope;
mod filter;
mod wavetable;

pub use envelope::bench_envelope;
pub use filter::bench_filter;
pub use wavetable::bench_wavetable;
