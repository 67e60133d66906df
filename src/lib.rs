pub mod config; // Engine sizing and defaults
pub mod dsp;
pub mod error;
pub mod params; // Control-rate parameter surface
pub mod synth; // Voice management and polyphony

pub use config::EngineConfig;
pub use dsp::wavetable::{Waveform, WavetableBank};
pub use error::ConfigError;
pub use params::{ParamSnapshot, SynthParams};
#[cfg(feature = "rtrb")]
pub use params::ParameterSurface;
#[cfg(feature = "rtrb")]
pub use synth::channel;
pub use synth::{
    engine::VoiceEngine, message::SynthMessage, unison::UnisonLayout, voice::Voice, SynthProcessor,
};

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;

/// Samples per wavetable cycle. Every table in the bank has this length.
pub const TABLE_LENGTH: usize = 1024;

/// Upper bound on stacked oscillators per voice.
pub const MAX_UNISON: usize = 16;

pub const DEFAULT_POOL_SIZE: usize = 16;
