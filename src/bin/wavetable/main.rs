//! wavetable - terminal front end for the polyphonic wavetable synth
//!
//! Run with: cargo run --bin wavetable
//! Set RUST_LOG (e.g. `RUST_LOG=saavy_wavetable=debug`) to write a log file.

mod app;
mod ui;

use std::{fs::File, sync::Mutex};

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use saavy_wavetable::EngineConfig;
use tracing_subscriber::EnvFilter;

const LOG_FILE: &str = "wavetable.log";

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    init_logging()?;

    let config = EngineConfig::default().with_voices(8);
    app::run(config)
}

/// The terminal belongs to the UI, so logs go to a file and only when asked
/// for.
fn init_logging() -> EyreResult<()> {
    if std::env::var_os("RUST_LOG").is_none() {
        return Ok(());
    }

    let file = File::create(LOG_FILE).wrap_err_with(|| format!("failed to create {LOG_FILE}"))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
