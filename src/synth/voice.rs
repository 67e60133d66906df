use std::sync::Arc;

use crate::{
    dsp::{
        envelope::{Adsr, Envelope, EnvelopeState},
        filter::ModulatedLowPass,
        wavetable::{Waveform, WavetableBank},
    },
    synth::unison::UnisonLayout,
    TABLE_LENGTH,
};

/// Release levels below this count as silence and free the voice.
pub const SILENCE_EPSILON: f32 = 1e-4;

/// Convert MIDI note number to frequency in Hz.
/// A4 = 440 Hz = MIDI note 69
#[inline]
pub fn midi_note_to_freq(note: u8) -> f64 {
    440.0 * 2.0_f64.powf((f64::from(note) - 69.0) / 12.0)
}

/// Table slots to advance per output sample for a given note.
#[inline]
pub fn phase_increment(note: u8, sample_rate: f32) -> f64 {
    TABLE_LENGTH as f64 * midi_note_to_freq(note) / f64::from(sample_rate)
}

/// One monophonic wavetable voice.
///
/// Signal path per sample: unison table readout → average → modulated
/// low-pass → envelope. All state is owned and preallocated; nothing here
/// allocates after construction.
pub struct Voice {
    active: bool,
    note: u8,
    velocity: f32,

    /// Fractional table index in [0, TABLE_LENGTH).
    phase: f64,
    phase_increment: f64,

    waveform: Waveform,
    unison: UnisonLayout,
    envelope: Envelope,
    filter: ModulatedLowPass,

    bank: Arc<WavetableBank>,
    sample_rate: f32,
}

impl Voice {
    pub fn new(bank: Arc<WavetableBank>, sample_rate: f32) -> Self {
        Self {
            active: false,
            note: 0,
            velocity: 0.0,
            phase: 0.0,
            phase_increment: 0.0,
            waveform: Waveform::default(),
            unison: UnisonLayout::default(),
            envelope: Envelope::new(sample_rate),
            filter: ModulatedLowPass::new(sample_rate),
            bank,
            sample_rate,
        }
    }

    pub fn prepare(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.envelope.set_sample_rate(sample_rate);
        self.filter.set_sample_rate(sample_rate);
        self.phase_increment = phase_increment(self.note, sample_rate);
    }

    /// Start (or retrigger) a note.
    ///
    /// Retriggering an active voice restarts the envelope from zero but keeps
    /// the oscillator phase running, so the waveform continues without a
    /// discontinuity and only the amplitude re-attacks.
    pub fn start(&mut self, note: u8, velocity: f32) {
        self.note = note;
        self.velocity = velocity;
        self.phase_increment = phase_increment(note, self.sample_rate);
        self.envelope.note_on();
        self.active = true;
    }

    /// Tail off through the release stage, or cut immediately.
    ///
    /// The release starts from the current level. A voice stopped before its
    /// attack has climbed past `SILENCE_EPSILON` (e.g. note-on and note-off in
    /// the same block) is therefore freed on its next sample without sounding.
    pub fn stop(&mut self, allow_tail_off: bool) {
        if allow_tail_off {
            self.envelope.note_off();
        } else {
            self.deactivate();
        }
    }

    /// Render one sample. Inactive voices return silence without touching
    /// any state.
    #[inline]
    pub fn render_sample(&mut self) -> f32 {
        if !self.active {
            return 0.0;
        }

        self.filter.update_coefficients();

        let table = self.bank.table(self.waveform);
        let length = TABLE_LENGTH as f64;
        let mut sum = 0.0;
        for &ratio in self.unison.ratios() {
            let index = (self.phase * f64::from(ratio)) % length;
            sum += table.sample(index as usize);
        }
        let mixed = sum / self.unison.size() as f32;

        let filtered = self.filter.process(mixed);

        self.phase += self.phase_increment;
        if self.phase >= length {
            self.phase %= length;
        }

        let level = self.envelope.next_sample();
        let released = self.envelope.state() == EnvelopeState::Release && level < SILENCE_EPSILON;
        if released || !self.envelope.is_active() {
            self.deactivate();
        }

        filtered * level
    }

    fn deactivate(&mut self) {
        self.active = false;
        self.envelope.reset();
        self.filter.reset();
    }

    pub fn set_unison_size(&mut self, size: usize) {
        self.unison = self.unison.with_size(size);
    }

    pub fn set_detune(&mut self, semitones: f32) {
        self.unison = self.unison.with_detune(semitones);
    }

    pub fn set_unison_layout(&mut self, layout: UnisonLayout) {
        self.unison = layout;
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    pub fn set_envelope(&mut self, params: Adsr) {
        self.envelope.set_params(params);
    }

    pub fn set_filter(&mut self, cutoff_hz: f32, resonance: f32) {
        self.filter.set_cutoff(cutoff_hz);
        self.filter.set_resonance(resonance);
    }

    pub fn set_lfo(&mut self, rate: f32, depth: f32) {
        self.filter.set_lfo(rate, depth);
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Assigned note; only meaningful while active.
    pub fn note(&self) -> u8 {
        self.note
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn phase_increment(&self) -> f64 {
        self.phase_increment
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    pub fn unison(&self) -> &UnisonLayout {
        &self.unison
    }

    pub fn envelope_level(&self) -> f32 {
        self.envelope.level()
    }

    pub fn envelope_stage(&self) -> EnvelopeState {
        self.envelope.state()
    }

    pub fn filter(&self) -> &ModulatedLowPass {
        &self.filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48_000.0;

    fn voice() -> Voice {
        Voice::new(Arc::new(WavetableBank::generate()), SAMPLE_RATE)
    }

    fn quick_voice() -> Voice {
        let mut v = voice();
        v.set_envelope(Adsr::new(0.001, 0.001, 0.5, 0.002));
        v
    }

    #[test]
    fn inactive_voice_is_silent_and_untouched() {
        let mut v = voice();
        for _ in 0..64 {
            assert_eq!(v.render_sample(), 0.0);
        }
        assert_eq!(v.phase(), 0.0);
        assert_eq!(v.filter().lfo().phase(), 0.0);
        assert_eq!(v.envelope_stage(), EnvelopeState::Idle);
    }

    #[test]
    fn increment_matches_note_frequency() {
        let inc = phase_increment(69, SAMPLE_RATE);
        let expected = TABLE_LENGTH as f64 * 440.0 / 48_000.0;
        assert!((inc - expected).abs() < 1e-9);
    }

    #[test]
    fn octave_doubles_increment() {
        let low = phase_increment(57, SAMPLE_RATE);
        let high = phase_increment(69, SAMPLE_RATE);
        assert!((high / low - 2.0).abs() < 1e-12);
    }

    #[test]
    fn start_then_one_sample_opens_envelope() {
        let mut v = voice();
        v.start(60, 1.0);
        assert!(v.is_active());
        v.render_sample();
        assert!(v.envelope_level() > 0.0);
        assert_eq!(v.envelope_stage(), EnvelopeState::Attack);
    }

    #[test]
    fn phase_wraps_within_table() {
        let mut v = voice();
        v.set_envelope(Adsr::new(0.01, 0.01, 1.0, 0.1));
        v.start(127, 1.0);
        for _ in 0..10_000 {
            v.render_sample();
            assert!((0.0..TABLE_LENGTH as f64).contains(&v.phase()));
        }
    }

    #[test]
    fn retrigger_keeps_phase_and_restarts_envelope() {
        let mut v = voice();
        v.start(60, 1.0);
        for _ in 0..100 {
            v.render_sample();
        }
        let phase = v.phase();
        let level = v.envelope_level();
        assert!(level > 0.0);

        v.start(60, 0.5);
        assert_eq!(v.phase(), phase);
        assert_eq!(v.envelope_level(), 0.0);
        assert_eq!(v.envelope_stage(), EnvelopeState::Attack);
        assert_eq!(v.velocity(), 0.5);
    }

    #[test]
    fn hard_stop_deactivates_immediately() {
        let mut v = voice();
        v.start(64, 1.0);
        v.render_sample();
        v.stop(false);
        assert!(!v.is_active());
        assert_eq!(v.envelope_stage(), EnvelopeState::Idle);
        assert_eq!(v.render_sample(), 0.0);
    }

    #[test]
    fn tail_off_keeps_sounding_until_release_ends() {
        let mut v = quick_voice();
        v.start(64, 1.0);
        for _ in 0..480 {
            v.render_sample();
        }

        v.stop(true);
        assert!(v.is_active(), "voice stays active while releasing");
        assert_eq!(v.envelope_stage(), EnvelopeState::Release);

        // 2ms release at 48kHz is 96 samples
        for _ in 0..200 {
            v.render_sample();
        }
        assert!(!v.is_active(), "voice frees itself once the release is silent");
    }

    #[test]
    fn stop_before_any_sample_frees_on_next_render() {
        let mut v = voice();
        v.start(60, 1.0);
        v.stop(true);
        assert!(v.is_active());
        assert_eq!(v.render_sample(), 0.0);
        assert!(!v.is_active());
    }

    #[test]
    fn output_stays_bounded() {
        for waveform in Waveform::ALL {
            let mut v = voice();
            v.set_waveform(waveform);
            v.set_unison_size(5);
            v.set_detune(0.1);
            v.set_envelope(Adsr::new(0.001, 0.01, 1.0, 0.1));
            v.start(48, 1.0);
            for _ in 0..4_800 {
                let s = v.render_sample();
                assert!(s.is_finite() && s.abs() <= 2.0, "{waveform:?} produced {s}");
            }
        }
    }

    #[test]
    fn unison_setters_update_layout() {
        let mut v = voice();
        v.set_unison_size(4);
        v.set_detune(0.0);
        assert_eq!(v.unison().ratios(), &[1.0; 4]);

        v.set_unison_size(0);
        assert_eq!(v.unison().size(), 1);

        let layout = UnisonLayout::new(3, 1.0);
        v.set_unison_layout(layout);
        assert_eq!(*v.unison(), layout);
    }

    #[test]
    fn zero_detune_unison_matches_single_oscillator() {
        let mut single = voice();
        let mut stacked = voice();
        stacked.set_unison_size(8);
        stacked.set_detune(0.0);

        single.start(60, 1.0);
        stacked.start(60, 1.0);
        for _ in 0..1_000 {
            let a = single.render_sample();
            let b = stacked.render_sample();
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn prepare_rescales_increment() {
        let mut v = voice();
        v.start(69, 1.0);
        let at_48k = v.phase_increment();
        v.prepare(96_000.0);
        assert!((v.phase_increment() * 2.0 - at_48k).abs() < 1e-9);
    }
}
