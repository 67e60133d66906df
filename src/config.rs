#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{DEFAULT_POOL_SIZE, MAX_BLOCK_SIZE};

/// Sizing for one engine instance.
///
/// Everything here is fixed once the engine is built: the voice pool and the
/// message queue are allocated up front so nothing grows on the audio thread.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub sample_rate: f32,
    pub max_block_size: usize,
    /// Number of voices in the pool (maximum polyphony).
    pub voices: usize,
    /// Capacity of the control → audio message ring buffer.
    pub queue_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 48_000.0,
            max_block_size: MAX_BLOCK_SIZE,
            voices: DEFAULT_POOL_SIZE,
            queue_capacity: 256,
        }
    }
}

impl EngineConfig {
    pub fn with_sample_rate(mut self, sample_rate: f32) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_max_block_size(mut self, max_block_size: usize) -> Self {
        self.max_block_size = max_block_size;
        self
    }

    pub fn with_voices(mut self, voices: usize) -> Self {
        self.voices = voices;
        self
    }
}
