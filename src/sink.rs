// src/sink.rs

//! Output sink abstraction between the producer loops and the audio device.

use anyhow::Result;

/// Output stream sample rate in Hz. Fixed: every kernel's filter and
/// oscillator coefficients are derived from it.
pub const SAMPLE_RATE: u32 = 44_100;

/// Samples produced and written per production-loop iteration.
pub const CHUNK_SIZE: usize = 4096;

/// Destination for synthesized PCM chunks.
///
/// `write` blocks until the sink has accepted the whole chunk; that
/// backpressure is the production loop's only pacing mechanism. A sink is
/// owned by exactly one producer thread and is released by dropping it.
pub trait AudioSink {
    fn write(&mut self, chunk: &[i16]) -> Result<()>;
}

/// Opens sinks on behalf of producer threads.
///
/// The provider is shared across the engine (`Arc`) and must be callable
/// from any producer thread; the sink it returns stays on the thread that
/// opened it and does not need to be `Send`. The cpal-backed provider lives
/// in [`crate::output`]; tests substitute an in-memory one.
pub trait SinkProvider: Send + Sync {
    fn open(&self, sample_rate: u32) -> Result<Box<dyn AudioSink>>;
}
