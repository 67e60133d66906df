// Voice management, polyphony and the control → audio seam.
// The engine renders; the processor feeds it from the parameter surface.

pub mod engine;
pub mod message;
pub mod processor;
pub mod unison;
pub mod voice;

#[cfg(feature = "rtrb")]
pub use processor::channel;
pub use processor::SynthProcessor;
