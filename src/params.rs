//! Control-rate parameter surface.
//!
//! The control thread (UI, host automation) writes; the audio thread reads
//! once per block. Every scalar is its own atomic, so a reader can never see
//! half of a write. Values are clamped on the way in; the audio side trusts
//! what it loads.
//!
//! The unison layout is the one derived value: it is computed here, on the
//! control side, and shipped whole through the message queue.

use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};
#[cfg(feature = "rtrb")]
use std::sync::Arc;

#[cfg(feature = "rtrb")]
use rtrb::Producer;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::{
        envelope::Adsr,
        filter::{MAX_CUTOFF_HZ, MAX_RESONANCE, MIN_CUTOFF_HZ, MIN_RESONANCE},
        lfo::MAX_LFO_RATE,
        wavetable::Waveform,
    },
    error::finite,
    MAX_UNISON,
};
#[cfg(feature = "rtrb")]
use crate::synth::{message::SynthMessage, unison::UnisonLayout};

/// Longest accepted attack, decay or release, in seconds.
pub const MAX_ENVELOPE_TIME: f32 = 60.0;

/// f32 stored as its bit pattern.
#[derive(Debug)]
pub struct AtomicF32(AtomicU32);

impl AtomicF32 {
    pub fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    #[inline]
    pub fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Acquire))
    }

    #[inline]
    pub fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Release);
    }
}

/// Everything the renderer reads, captured at one point in time.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamSnapshot {
    pub adsr: Adsr,
    pub cutoff: f32,
    pub resonance: f32,
    /// Radians per second.
    pub lfo_rate: f32,
    /// Hz of cutoff swing either side of `cutoff`.
    pub lfo_depth: f32,
    pub waveform: Waveform,
    pub volume: f32,
    pub unison_size: usize,
    pub detune: f32,
}

impl Default for ParamSnapshot {
    fn default() -> Self {
        Self {
            adsr: Adsr::default(),
            cutoff: 2_000.0,
            resonance: 1.0,
            lfo_rate: 5.0,
            lfo_depth: 0.5,
            waveform: Waveform::Sine,
            volume: 1.0,
            unison_size: 1,
            detune: 0.0,
        }
    }
}

/// Shared atomic store behind the surface.
#[derive(Debug)]
pub struct SynthParams {
    attack: AtomicF32,
    decay: AtomicF32,
    sustain: AtomicF32,
    release: AtomicF32,
    cutoff: AtomicF32,
    resonance: AtomicF32,
    lfo_rate: AtomicF32,
    lfo_depth: AtomicF32,
    volume: AtomicF32,
    waveform: AtomicU8,
    unison_size: AtomicU32,
    detune: AtomicF32,
}

impl SynthParams {
    pub fn new(initial: ParamSnapshot) -> Self {
        Self {
            attack: AtomicF32::new(initial.adsr.attack),
            decay: AtomicF32::new(initial.adsr.decay),
            sustain: AtomicF32::new(initial.adsr.sustain),
            release: AtomicF32::new(initial.adsr.release),
            cutoff: AtomicF32::new(initial.cutoff),
            resonance: AtomicF32::new(initial.resonance),
            lfo_rate: AtomicF32::new(initial.lfo_rate),
            lfo_depth: AtomicF32::new(initial.lfo_depth),
            volume: AtomicF32::new(initial.volume),
            waveform: AtomicU8::new(initial.waveform as u8),
            unison_size: AtomicU32::new(initial.unison_size.clamp(1, MAX_UNISON) as u32),
            detune: AtomicF32::new(if initial.detune.is_finite() {
                initial.detune
            } else {
                0.0
            }),
        }
    }

    pub fn snapshot(&self) -> ParamSnapshot {
        ParamSnapshot {
            adsr: Adsr {
                attack: self.attack.load(),
                decay: self.decay.load(),
                sustain: self.sustain.load(),
                release: self.release.load(),
            },
            cutoff: self.cutoff.load(),
            resonance: self.resonance.load(),
            lfo_rate: self.lfo_rate.load(),
            lfo_depth: self.lfo_depth.load(),
            waveform: Waveform::try_from(self.waveform.load(Ordering::Acquire))
                .unwrap_or_default(),
            volume: self.volume.load(),
            unison_size: self.unison_size.load(Ordering::Acquire) as usize,
            detune: self.detune.load(),
        }
    }

    pub fn set_attack(&self, seconds: f32) {
        store_clamped("attack", &self.attack, seconds, 0.0, MAX_ENVELOPE_TIME);
    }

    pub fn set_decay(&self, seconds: f32) {
        store_clamped("decay", &self.decay, seconds, 0.0, MAX_ENVELOPE_TIME);
    }

    pub fn set_sustain(&self, level: f32) {
        store_clamped("sustain", &self.sustain, level, 0.0, 1.0);
    }

    pub fn set_release(&self, seconds: f32) {
        store_clamped("release", &self.release, seconds, 0.0, MAX_ENVELOPE_TIME);
    }

    pub fn set_filter_cutoff(&self, hz: f32) {
        store_clamped("cutoff", &self.cutoff, hz, MIN_CUTOFF_HZ, MAX_CUTOFF_HZ);
    }

    pub fn set_filter_resonance(&self, q: f32) {
        store_clamped("resonance", &self.resonance, q, MIN_RESONANCE, MAX_RESONANCE);
    }

    pub fn set_lfo_rate(&self, radians_per_second: f32) {
        store_clamped("lfo rate", &self.lfo_rate, radians_per_second, 0.0, MAX_LFO_RATE);
    }

    pub fn set_lfo_depth(&self, hz: f32) {
        store_clamped("lfo depth", &self.lfo_depth, hz, 0.0, MAX_CUTOFF_HZ);
    }

    pub fn set_volume(&self, volume: f32) {
        store_clamped("volume", &self.volume, volume, 0.0, 1.0);
    }

    pub fn set_waveform(&self, waveform: Waveform) {
        self.waveform.store(waveform as u8, Ordering::Release);
    }
}

impl Default for SynthParams {
    fn default() -> Self {
        Self::new(ParamSnapshot::default())
    }
}

fn store_clamped(name: &'static str, param: &AtomicF32, value: f32, min: f32, max: f32) {
    match finite(name, value) {
        Ok(value) => param.store(value.clamp(min, max)),
        Err(err) => tracing::warn!(%err, "parameter change rejected"),
    }
}

/// Control-side handle: parameter setters plus the note/layout queue.
///
/// There is exactly one per engine (it owns the queue's producer), which
/// makes it the single writer of every parameter.
#[cfg(feature = "rtrb")]
pub struct ParameterSurface {
    params: Arc<SynthParams>,
    tx: Producer<SynthMessage>,
}

#[cfg(feature = "rtrb")]
impl ParameterSurface {
    pub fn new(params: Arc<SynthParams>, tx: Producer<SynthMessage>) -> Self {
        Self { params, tx }
    }

    pub fn params(&self) -> &Arc<SynthParams> {
        &self.params
    }

    pub fn snapshot(&self) -> ParamSnapshot {
        self.params.snapshot()
    }

    pub fn set_attack(&self, seconds: f32) {
        self.params.set_attack(seconds);
    }

    pub fn set_decay(&self, seconds: f32) {
        self.params.set_decay(seconds);
    }

    pub fn set_sustain(&self, level: f32) {
        self.params.set_sustain(level);
    }

    pub fn set_release(&self, seconds: f32) {
        self.params.set_release(seconds);
    }

    pub fn set_adsr(&self, adsr: Adsr) {
        self.set_attack(adsr.attack);
        self.set_decay(adsr.decay);
        self.set_sustain(adsr.sustain);
        self.set_release(adsr.release);
    }

    pub fn set_filter_cutoff(&self, hz: f32) {
        self.params.set_filter_cutoff(hz);
    }

    pub fn set_filter_resonance(&self, q: f32) {
        self.params.set_filter_resonance(q);
    }

    pub fn set_lfo_rate(&self, radians_per_second: f32) {
        self.params.set_lfo_rate(radians_per_second);
    }

    pub fn set_lfo_depth(&self, hz: f32) {
        self.params.set_lfo_depth(hz);
    }

    pub fn set_volume(&self, volume: f32) {
        self.params.set_volume(volume);
    }

    pub fn set_waveform(&self, waveform: Waveform) {
        self.params.set_waveform(waveform);
    }

    /// Select a waveform by number (0 sine … 3 sawtooth). Unknown numbers are
    /// logged and leave the selection unchanged.
    pub fn set_waveform_index(&self, selector: i32) {
        match Waveform::try_from(selector) {
            Ok(waveform) => self.set_waveform(waveform),
            Err(err) => tracing::warn!(%err, "waveform change rejected"),
        }
    }

    /// Publish a new unison size. Returns false if the queue was full, in
    /// which case the published size is left as it was.
    pub fn set_unison_size(&mut self, size: usize) -> bool {
        let size = size.clamp(1, MAX_UNISON);
        let layout = UnisonLayout::new(size, self.params.detune.load());
        let sent = self.send(SynthMessage::Unison(layout));
        if sent {
            self.params.unison_size.store(size as u32, Ordering::Release);
        }
        sent
    }

    /// Publish a new detune amount in semitones. Returns false if the queue
    /// was full, in which case the published detune is left as it was.
    pub fn set_detune(&mut self, semitones: f32) -> bool {
        let semitones = match finite("detune", semitones) {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!(%err, "parameter change rejected");
                return false;
            }
        };
        let size = self.params.unison_size.load(Ordering::Acquire) as usize;
        let layout = UnisonLayout::new(size, semitones);
        let sent = self.send(SynthMessage::Unison(layout));
        if sent {
            self.params.detune.store(semitones);
        }
        sent
    }

    pub fn note_on(&mut self, note: u8, velocity: f32) -> bool {
        if note > 127 {
            tracing::warn!(note, "note-on outside MIDI range ignored");
            return false;
        }
        self.send(SynthMessage::NoteOn {
            note,
            velocity: velocity.clamp(0.0, 1.0),
        })
    }

    pub fn note_off(&mut self, note: u8, velocity: f32) -> bool {
        self.send(SynthMessage::NoteOff { note, velocity })
    }

    pub fn all_notes_off(&mut self) -> bool {
        self.send(SynthMessage::AllNotesOff)
    }

    fn send(&mut self, message: SynthMessage) -> bool {
        match self.tx.push(message) {
            Ok(()) => true,
            Err(_) => {
                tracing::warn!(?message, "control queue full, message dropped");
                false
            }
        }
    }
}

#[cfg(feature = "rtrb")]
impl std::fmt::Debug for ParameterSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParameterSurface")
            .field("params", &self.params)
            .field("queue_slots", &self.tx.slots())
            .finish()
    }
}
