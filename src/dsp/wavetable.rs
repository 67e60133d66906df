#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use crate::{error::ConfigError, TABLE_LENGTH};

/*
Wavetables
==========

A wavetable is one cycle of a waveform, sampled once and stored. Playing a
note means walking through the table at a speed proportional to the pitch:

    phase increment = TABLE_LENGTH * frequency / sample_rate

At 48kHz with a 1024-sample table, A4 (440 Hz) advances ~9.39 slots per
sample. The phase is fractional; we read the nearest slot below it
(truncation), which is cheap and aliasing-prone at high pitches. That is the
classic sound of simple wavetable synths.

The four tables
---------------

    Sine      sin(2π i / L)
    Square    +1 for the first half, -1 for the second
    Triangle  1 - 4|round(i/L) - i/L|      (starts at +1, dips to -1 mid-cycle)
    Sawtooth  2(i/L) - 1                   (ramps -1 → +1)

Tables depend only on TABLE_LENGTH, never on sample rate, so a bank can be
generated once and shared by every voice for the lifetime of the engine.
*/

/// Selects one of the four tables in the bank.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Waveform {
    #[default]
    Sine = 0,
    Square = 1,
    Triangle = 2,
    Sawtooth = 3,
}

impl Waveform {
    pub const ALL: [Waveform; 4] = [
        Waveform::Sine,
        Waveform::Square,
        Waveform::Triangle,
        Waveform::Sawtooth,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Waveform::Sine => "sine",
            Waveform::Square => "square",
            Waveform::Triangle => "triangle",
            Waveform::Sawtooth => "sawtooth",
        }
    }
}

impl TryFrom<i32> for Waveform {
    type Error = ConfigError;

    fn try_from(selector: i32) -> Result<Self, Self::Error> {
        match selector {
            0 => Ok(Waveform::Sine),
            1 => Ok(Waveform::Square),
            2 => Ok(Waveform::Triangle),
            3 => Ok(Waveform::Sawtooth),
            other => Err(ConfigError::UnknownWaveform(other)),
        }
    }
}

impl TryFrom<u8> for Waveform {
    type Error = ConfigError;

    fn try_from(selector: u8) -> Result<Self, Self::Error> {
        Waveform::try_from(i32::from(selector))
    }
}

/// One cycle of a waveform, `TABLE_LENGTH` samples in [-1.0, 1.0].
pub struct WaveformTable {
    samples: Box<[f32]>,
}

impl WaveformTable {
    fn from_fn(f: impl Fn(usize) -> f32) -> Self {
        let samples = (0..TABLE_LENGTH).map(f).collect::<Vec<_>>();
        Self {
            samples: samples.into_boxed_slice(),
        }
    }

    fn sine() -> Self {
        Self::from_fn(|i| (TAU * i as f64 / TABLE_LENGTH as f64).sin() as f32)
    }

    fn square() -> Self {
        Self::from_fn(|i| if i < TABLE_LENGTH / 2 { 1.0 } else { -1.0 })
    }

    fn triangle() -> Self {
        Self::from_fn(|i| {
            let phase = i as f32 / TABLE_LENGTH as f32;
            1.0 - 4.0 * (phase.round() - phase).abs()
        })
    }

    fn sawtooth() -> Self {
        Self::from_fn(|i| 2.0 * (i as f32 / TABLE_LENGTH as f32) - 1.0)
    }

    /// Nearest-index read. Indices past the end wrap around.
    #[inline]
    pub fn sample(&self, index: usize) -> f32 {
        self.samples[index % TABLE_LENGTH]
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// The four shared, immutable tables.
pub struct WavetableBank {
    tables: [WaveformTable; 4],
}

impl WavetableBank {
    /// Fill every table. Deterministic: two banks are always identical.
    pub fn generate() -> Self {
        Self {
            tables: [
                WaveformTable::sine(),
                WaveformTable::square(),
                WaveformTable::triangle(),
                WaveformTable::sawtooth(),
            ],
        }
    }

    pub fn table(&self, waveform: Waveform) -> &WaveformTable {
        &self.tables[waveform.index()]
    }
}

impl Default for WavetableBank {
    fn default() -> Self {
        Self::generate()
    }
}
