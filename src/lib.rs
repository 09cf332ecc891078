//! Procedural soundscape engine.
//!
//! Synthesizes continuous noise colors and nature/ambient soundscapes per
//! sample (no files, no samples), streams them to the audio device on
//! dedicated producer threads, and mixes up to five concurrent sounds with
//! independent volume, pause/resume, and lifecycle control.
//!
//! Library-style component: the embedding application owns a [`SoundEngine`]
//! and drives it from its control thread.
//!
//! ```no_run
//! use hush::{catalog, SoundEngine};
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut engine = SoundEngine::new();
//! let rain = catalog::sound_by_id("rain").unwrap();
//! engine.start_sound(rain, 0.7)?;
//! engine.set_volume("rain", 0.4);
//! engine.stop_all();
//! # Ok(())
//! # }
//! ```

pub mod ambience;
pub mod catalog;
pub mod engine;
pub mod noise;
pub mod output;
pub mod player;
pub mod random;
pub mod sink;
pub mod voice;

pub use catalog::{ActiveSound, Sound, SoundCategory, SoundSourceType, DEFAULT_VOLUME};
pub use engine::{SoundEngine, MAX_SIMULTANEOUS_SOUNDS};
pub use player::SoundPlayer;
pub use sink::{AudioSink, SinkProvider, CHUNK_SIZE, SAMPLE_RATE};
