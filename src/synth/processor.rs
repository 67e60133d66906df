use std::sync::Arc;

#[cfg(feature = "rtrb")]
use rtrb::{Consumer, RingBuffer};

use crate::{
    params::SynthParams,
    synth::{
        engine::VoiceEngine,
        message::{MessageReceiver, SynthMessage},
        unison::UnisonLayout,
    },
};
#[cfg(feature = "rtrb")]
use crate::{config::EngineConfig, params::ParameterSurface};

/// Audio-thread half of the synth: owns the engine, reads the shared
/// parameters and drains the control queue at the top of every block.
pub struct SynthProcessor<R: MessageReceiver> {
    engine: VoiceEngine,
    params: Arc<SynthParams>,
    rx: R,
}

impl<R: MessageReceiver> SynthProcessor<R> {
    /// Wrap an engine. The unison layout published in `params` is applied
    /// here, once, since later layouts only arrive as messages.
    pub fn new(mut engine: VoiceEngine, params: Arc<SynthParams>, rx: R) -> Self {
        let initial = params.snapshot();
        engine.set_unison_layout(UnisonLayout::new(initial.unison_size, initial.detune));
        Self { engine, params, rx }
    }

    pub fn prepare(&mut self, sample_rate: f32, max_block_size: usize) {
        self.engine.prepare(sample_rate, max_block_size);
    }

    /// Render `num_samples` into every channel (planar).
    pub fn process(&mut self, channels: &mut [&mut [f32]], num_samples: usize) {
        self.begin_block();
        self.engine.render_block(channels, num_samples);
    }

    /// Render into an interleaved buffer of `channels` channels.
    pub fn process_interleaved(&mut self, out: &mut [f32], channels: usize) {
        self.begin_block();
        self.engine.render_interleaved(out, channels);
    }

    fn begin_block(&mut self) {
        let snapshot = self.params.snapshot();
        self.engine.apply_snapshot(&snapshot);

        while let Some(msg) = self.rx.pop() {
            match msg {
                SynthMessage::NoteOn { note, velocity } => self.engine.note_on(note, velocity),
                SynthMessage::NoteOff { note, velocity } => self.engine.note_off(note, velocity),
                SynthMessage::AllNotesOff => self.engine.all_notes_off(true),
                SynthMessage::Unison(layout) => self.engine.set_unison_layout(layout),
            }
        }
    }

    pub fn engine(&self) -> &VoiceEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut VoiceEngine {
        &mut self.engine
    }

    pub fn params(&self) -> &Arc<SynthParams> {
        &self.params
    }
}

/// Build a connected control/audio pair from one configuration.
///
/// The processor comes back already prepared for `config.sample_rate` and
/// `config.max_block_size`; an invalid config leaves it unprepared (silent)
/// and is logged.
#[cfg(feature = "rtrb")]
pub fn channel(config: &EngineConfig) -> (ParameterSurface, SynthProcessor<Consumer<SynthMessage>>) {
    let (tx, rx) = RingBuffer::new(config.queue_capacity.max(1));
    let params = Arc::new(SynthParams::default());

    let mut engine = VoiceEngine::new(config.voices);
    engine.prepare(config.sample_rate, config.max_block_size);
    tracing::debug!(
        voices = engine.pool_size(),
        queue_capacity = config.queue_capacity,
        "synth channel created"
    );

    let surface = ParameterSurface::new(Arc::clone(&params), tx);
    let processor = SynthProcessor::new(engine, params, rx);
    (surface, processor)
}
