//! Configuration errors.
//!
//! None of these escape the realtime or control operations: setters and
//! `prepare` log the error and leave state untouched. They are returned
//! directly only by checked conversions such as `Waveform::try_from`.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    #[error("sample rate must be positive and finite, got {0}")]
    InvalidSampleRate(f32),

    #[error("block size must be positive, got {0}")]
    InvalidBlockSize(usize),

    #[error("unknown waveform selector {0} (expected 0..=3)")]
    UnknownWaveform(i32),

    #[error("{0} must be a finite number")]
    NonFiniteValue(&'static str),
}

/// Reject NaN and infinities before they reach the atomics.
pub(crate) fn finite(name: &'static str, value: f32) -> Result<f32, ConfigError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NonFiniteValue(name))
    }
}
