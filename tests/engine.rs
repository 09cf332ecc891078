// Engine lifecycle tests against an in-memory sink, so no audio hardware is
// required.

use anyhow::Result;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use hush::catalog::{self, Sound};
use hush::sink::{AudioSink, SinkProvider};
use hush::{SoundEngine, MAX_SIMULTANEOUS_SOUNDS};

/// Sink that swallows chunks with a small delay standing in for device
/// backpressure.
struct MemorySink {
    chunks_written: Arc<AtomicUsize>,
}

impl AudioSink for MemorySink {
    fn write(&mut self, _chunk: &[i16]) -> Result<()> {
        self.chunks_written.fetch_add(1, Ordering::Relaxed);
        thread::sleep(Duration::from_millis(1));
        Ok(())
    }
}

/// Provider that can be told to start refusing opens after a quota, to
/// exercise failed-start paths.
struct MemoryProvider {
    opens: AtomicUsize,
    open_limit: usize,
    chunks_written: Arc<AtomicUsize>,
}

impl MemoryProvider {
    fn unlimited() -> Arc<Self> {
        Arc::new(Self {
            opens: AtomicUsize::new(0),
            open_limit: usize::MAX,
            chunks_written: Arc::new(AtomicUsize::new(0)),
        })
    }

    fn with_open_limit(limit: usize) -> Arc<Self> {
        Arc::new(Self {
            opens: AtomicUsize::new(0),
            open_limit: limit,
            chunks_written: Arc::new(AtomicUsize::new(0)),
        })
    }
}

impl SinkProvider for MemoryProvider {
    fn open(&self, _sample_rate: u32) -> Result<Box<dyn AudioSink>> {
        if self.opens.fetch_add(1, Ordering::SeqCst) >= self.open_limit {
            return Err(anyhow::anyhow!("no output device available"));
        }
        Ok(Box::new(MemorySink {
            chunks_written: self.chunks_written.clone(),
        }))
    }
}

fn engine() -> SoundEngine {
    SoundEngine::with_provider(MemoryProvider::unlimited())
}

fn sound(id: &str) -> &'static Sound {
    catalog::sound_by_id(id).expect("catalog id")
}

#[test]
fn started_sound_appears_in_active_set() {
    let mut engine = engine();
    assert!(engine.start_sound(sound("white_noise"), 0.7).unwrap());
    assert!(engine.is_playing());
    assert!(engine.is_sound_active("white_noise"));
    let active = engine.active_sounds();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].sound.id, "white_noise");
    engine.stop_all();
}

#[test]
fn producer_actually_writes_chunks() {
    let provider = MemoryProvider::unlimited();
    let chunks = provider.chunks_written.clone();
    let mut engine = SoundEngine::with_provider(provider);
    engine.start_sound(sound("rain"), 0.5).unwrap();
    thread::sleep(Duration::from_millis(50));
    engine.stop_all();
    assert!(chunks.load(Ordering::Relaxed) > 0);
}

#[test]
fn restarting_an_active_sound_is_a_no_op() {
    let mut engine = engine();
    assert!(engine.start_sound(sound("ocean"), 0.5).unwrap());
    assert!(!engine.start_sound(sound("ocean"), 0.9).unwrap());
    let active = engine.active_sounds();
    assert_eq!(active.len(), 1);
    // The original volume survives the ignored restart.
    assert!((active[0].volume - 0.5).abs() < 1e-6);
    engine.stop_all();
}

#[test]
fn sixth_sound_is_refused_and_stop_all_clears() {
    let mut engine = engine();
    let ids = ["white_noise", "pink_noise", "brown_noise", "rain", "ocean"];
    for id in ids {
        assert!(engine.start_sound(sound(id), 0.7).unwrap(), "{}", id);
    }
    assert_eq!(engine.active_sounds().len(), MAX_SIMULTANEOUS_SOUNDS);

    assert!(!engine.start_sound(sound("forest"), 0.7).unwrap());
    assert_eq!(engine.active_sounds().len(), MAX_SIMULTANEOUS_SOUNDS);
    assert!(!engine.is_sound_active("forest"));

    engine.stop_all();
    assert!(engine.active_sounds().is_empty());
    assert!(!engine.is_playing());
    assert!(!engine.has_paused_sounds());
}

#[test]
fn toggle_twice_returns_true_then_false() {
    let mut engine = engine();
    assert!(engine.toggle_sound(sound("pink_noise"), 0.7).unwrap());
    assert!(engine.is_sound_active("pink_noise"));
    assert!(!engine.toggle_sound(sound("pink_noise"), 0.7).unwrap());
    assert!(!engine.is_sound_active("pink_noise"));
    assert!(!engine.is_playing());
}

#[test]
fn toggle_at_capacity_is_refused() {
    let mut engine = engine();
    for id in ["white_noise", "pink_noise", "brown_noise", "rain", "ocean"] {
        engine.start_sound(sound(id), 0.7).unwrap();
    }
    assert!(!engine.toggle_sound(sound("wind"), 0.7).unwrap());
    assert_eq!(engine.active_sounds().len(), MAX_SIMULTANEOUS_SOUNDS);
    engine.stop_all();
}

#[test]
fn pause_and_resume_restore_the_same_mix() {
    let mut engine = engine();
    engine.start_sound(sound("rain"), 0.3).unwrap();
    engine.start_sound(sound("fireplace"), 0.9).unwrap();

    engine.pause_all();
    assert!(!engine.is_playing());
    assert!(engine.active_sounds().is_empty());
    assert!(engine.has_paused_sounds());

    engine.resume_all();
    assert!(!engine.has_paused_sounds());
    let mut active = engine.active_sounds();
    active.sort_by(|a, b| a.sound.id.cmp(&b.sound.id));
    assert_eq!(active.len(), 2);
    assert_eq!(active[0].sound.id, "fireplace");
    assert!((active[0].volume - 0.9).abs() < 1e-6);
    assert_eq!(active[1].sound.id, "rain");
    assert!((active[1].volume - 0.3).abs() < 1e-6);
    engine.stop_all();
}

#[test]
fn set_volume_clamps_out_of_range_input() {
    let mut engine = engine();
    engine.start_sound(sound("fan"), 0.5).unwrap();

    engine.set_volume("fan", -0.5);
    assert_eq!(engine.active_sounds()[0].volume, 0.0);

    engine.set_volume("fan", 1.5);
    assert_eq!(engine.active_sounds()[0].volume, 1.0);
    engine.stop_all();
}

#[test]
fn operations_on_unknown_ids_are_silent_no_ops() {
    let mut engine = engine();
    engine.stop_sound("nope");
    engine.set_volume("nope", 0.5);
    engine.stop_all();
    engine.resume_all();
    assert!(!engine.is_playing());
}

#[test]
fn failed_sink_open_leaves_no_partial_state() {
    let mut engine = SoundEngine::with_provider(MemoryProvider::with_open_limit(0));
    let err = engine.start_sound(sound("rain"), 0.7);
    assert!(err.is_err());
    assert!(!engine.is_playing());
    assert!(!engine.is_sound_active("rain"));
    assert!(engine.active_sounds().is_empty());
}

#[test]
fn failed_start_does_not_affect_running_sounds() {
    let mut engine = SoundEngine::with_provider(MemoryProvider::with_open_limit(1));
    assert!(engine.start_sound(sound("rain"), 0.7).unwrap());
    assert!(engine.start_sound(sound("ocean"), 0.7).is_err());
    assert!(engine.is_sound_active("rain"));
    assert_eq!(engine.active_sounds().len(), 1);
    engine.stop_all();
}

#[test]
fn resume_survives_individual_failures() {
    // Two sounds paused, but only one more sink open is allowed: exactly
    // one resumes, the other is dropped with a warning rather than an error.
    let mut engine = SoundEngine::with_provider(MemoryProvider::with_open_limit(3));
    engine.start_sound(sound("rain"), 0.5).unwrap();
    engine.start_sound(sound("wind"), 0.5).unwrap();
    engine.pause_all();
    engine.resume_all();
    assert_eq!(engine.active_sounds().len(), 1);
    assert!(!engine.has_paused_sounds());
    engine.stop_all();
}
