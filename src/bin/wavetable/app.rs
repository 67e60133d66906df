//! Audio device setup and the render callback

use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::RingBuffer;

use saavy_wavetable::{channel, EngineConfig};

use crate::ui::{UiApp, SCOPE_LEN};

pub fn run(config: EngineConfig) -> EyreResult<()> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let output = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let sample_rate = output.sample_rate().0 as f32;
    let channels = output.channels() as usize;
    let config = config.with_sample_rate(sample_rate);

    let (surface, mut processor) = channel(&config);
    tracing::info!(sample_rate, channels, voices = config.voices, "audio config");

    // Mono tap of the output for the oscilloscope.
    let (mut scope_tx, scope_rx) = RingBuffer::<f32>::new(SCOPE_LEN * 4);

    let stream = device.build_output_stream(
        &output.into(),
        move |data: &mut [f32], _| {
            processor.process_interleaved(data, channels);
            for frame in data.chunks_exact(channels.max(1)) {
                if scope_tx.push(frame[0]).is_err() {
                    break;
                }
            }
        },
        |err| tracing::error!(%err, "audio stream error"),
        None,
    )?;
    stream.play()?;

    let mut terminal = ratatui::init();
    let result = UiApp::new(surface, scope_rx, sample_rate).run(&mut terminal);
    ratatui::restore();

    drop(stream);
    result
}
