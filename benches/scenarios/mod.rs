//! Real-world scenario benchmarks.
//!
//! Single voices with growing unison stacks, then the whole pool under load.

mod engine;
mod voices;

pub use engine::bench_engine;
pub use voices::bench_voices;
