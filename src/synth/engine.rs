use std::sync::Arc;

use crate::{
    dsp::{envelope::Adsr, wavetable::Waveform, wavetable::WavetableBank},
    error::ConfigError,
    params::ParamSnapshot,
    synth::{unison::UnisonLayout, voice::Voice},
};

/// Fixed pool of wavetable voices.
///
/// Allocation policy: a note-on takes the first inactive voice. When every
/// voice is busy the note is dropped; nothing is stolen. A note-off releases
/// every active voice holding that note.
///
/// Mixing divides the voice sum by the pool size, not by the number of
/// sounding voices. Loudness per voice is therefore constant regardless of
/// polyphony; the cost is that a single note uses only `1 / pool_size` of
/// the available headroom.
pub struct VoiceEngine {
    voices: Vec<Voice>,
    bank: Arc<WavetableBank>,
    scratch: Vec<f32>,
    volume: f32,
    sample_rate: f32,
    prepared: bool,
}

impl VoiceEngine {
    pub fn new(pool_size: usize) -> Self {
        Self::with_bank(pool_size, Arc::new(WavetableBank::generate()))
    }

    pub fn with_bank(pool_size: usize, bank: Arc<WavetableBank>) -> Self {
        let sample_rate = 48_000.0;
        let voices = (0..pool_size.max(1))
            .map(|_| Voice::new(Arc::clone(&bank), sample_rate))
            .collect();

        Self {
            voices,
            bank,
            scratch: Vec::new(),
            volume: 1.0,
            sample_rate,
            prepared: false,
        }
    }

    /// Size buffers for the host's stream. Must run before rendering.
    ///
    /// Invalid values are logged and ignored; the engine keeps its previous
    /// configuration (or stays silent if it was never prepared).
    pub fn prepare(&mut self, sample_rate: f32, max_block_size: usize) {
        if let Err(err) = validate_stream(sample_rate, max_block_size) {
            tracing::warn!(%err, "prepare rejected");
            return;
        }

        self.sample_rate = sample_rate;
        self.scratch = vec![0.0; max_block_size];
        for voice in &mut self.voices {
            voice.prepare(sample_rate);
        }
        self.prepared = true;

        tracing::debug!(
            sample_rate,
            max_block_size,
            voices = self.voices.len(),
            "voice engine prepared"
        );
    }

    pub fn note_on(&mut self, note: u8, velocity: f32) {
        if note > 127 {
            return;
        }
        let velocity = velocity.clamp(0.0, 1.0);

        if let Some(voice) = self.voices.iter_mut().find(|v| !v.is_active()) {
            voice.start(note, velocity);
        }
    }

    /// Release every active voice playing `note`. Unmatched notes are ignored.
    pub fn note_off(&mut self, note: u8, _velocity: f32) {
        for voice in self
            .voices
            .iter_mut()
            .filter(|v| v.is_active() && v.note() == note)
        {
            voice.stop(true);
        }
    }

    pub fn all_notes_off(&mut self, allow_tail_off: bool) {
        for voice in self.voices.iter_mut().filter(|v| v.is_active()) {
            voice.stop(allow_tail_off);
        }
    }

    /// Render `num_samples` of the mono mix into every channel.
    ///
    /// Channels are cleared first. An unprepared engine leaves them silent.
    pub fn render_block(&mut self, channels: &mut [&mut [f32]], num_samples: usize) {
        let num_samples = channels
            .iter()
            .map(|c| c.len())
            .min()
            .unwrap_or(0)
            .min(num_samples);

        for channel in channels.iter_mut() {
            channel[..num_samples].fill(0.0);
        }
        if !self.prepared || num_samples == 0 {
            return;
        }

        let mut offset = 0;
        while offset < num_samples {
            let len = (num_samples - offset).min(self.scratch.len());
            self.mix_into_scratch(len);

            for channel in channels.iter_mut() {
                channel[offset..offset + len].copy_from_slice(&self.scratch[..len]);
            }
            offset += len;
        }
    }

    /// Render into an interleaved buffer (`frames * channels` samples).
    pub fn render_interleaved(&mut self, out: &mut [f32], channels: usize) {
        out.fill(0.0);
        if !self.prepared || channels == 0 {
            return;
        }

        let frames = out.len() / channels;
        let mut frame = 0;
        while frame < frames {
            let len = (frames - frame).min(self.scratch.len());
            self.mix_into_scratch(len);

            for (i, &sample) in self.scratch[..len].iter().enumerate() {
                let start = (frame + i) * channels;
                out[start..start + channels].fill(sample);
            }
            frame += len;
        }
    }

    fn mix_into_scratch(&mut self, len: usize) {
        let gain = self.volume / self.voices.len() as f32;
        for sample in &mut self.scratch[..len] {
            let mut mix = 0.0;
            for voice in &mut self.voices {
                mix += voice.render_sample();
            }
            *sample = mix * gain;
        }
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        for voice in &mut self.voices {
            voice.set_waveform(waveform);
        }
    }

    pub fn set_unison_size(&mut self, size: usize) {
        for voice in &mut self.voices {
            voice.set_unison_size(size);
        }
    }

    pub fn set_detune(&mut self, semitones: f32) {
        for voice in &mut self.voices {
            voice.set_detune(semitones);
        }
    }

    pub fn set_unison_layout(&mut self, layout: UnisonLayout) {
        for voice in &mut self.voices {
            voice.set_unison_layout(layout);
        }
    }

    pub fn set_volume(&mut self, volume: f32) {
        if volume.is_finite() {
            self.volume = volume.clamp(0.0, 1.0);
        }
    }

    pub fn set_envelope(&mut self, params: Adsr) {
        for voice in &mut self.voices {
            voice.set_envelope(params);
        }
    }

    pub fn set_filter(&mut self, cutoff_hz: f32, resonance: f32) {
        for voice in &mut self.voices {
            voice.set_filter(cutoff_hz, resonance);
        }
    }

    pub fn set_lfo(&mut self, rate: f32, depth: f32) {
        for voice in &mut self.voices {
            voice.set_lfo(rate, depth);
        }
    }

    /// Apply every scalar control value. The unison layout is not part of
    /// the snapshot; it arrives whole through `set_unison_layout`.
    pub fn apply_snapshot(&mut self, snapshot: &ParamSnapshot) {
        self.set_volume(snapshot.volume);
        for voice in &mut self.voices {
            voice.set_waveform(snapshot.waveform);
            voice.set_envelope(snapshot.adsr);
            voice.set_filter(snapshot.cutoff, snapshot.resonance);
            voice.set_lfo(snapshot.lfo_rate, snapshot.lfo_depth);
        }
    }

    pub fn pool_size(&self) -> usize {
        self.voices.len()
    }

    pub fn active_voice_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn bank(&self) -> &WavetableBank {
        &self.bank
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }
}

fn validate_stream(sample_rate: f32, max_block_size: usize) -> Result<(), ConfigError> {
    if !(sample_rate.is_finite() && sample_rate > 0.0) {
        return Err(ConfigError::InvalidSampleRate(sample_rate));
    }
    if max_block_size == 0 {
        return Err(ConfigError::InvalidBlockSize(max_block_size));
    }
    Ok(())
}
