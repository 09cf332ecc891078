// src/player.rs

//! One playing sound: a producer thread looping
//! "synthesize chunk -> scale by volume -> blocking write to the sink".

use anyhow::Result;
use log::{info, warn};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};

use crate::catalog::SoundSourceType;
use crate::random::GaussianSource;
use crate::sink::{SinkProvider, CHUNK_SIZE, SAMPLE_RATE};
use crate::voice::Voice;

// Scaler for storing float values in atomics.
pub const PARAM_SCALER: f32 = 1_000_000.0;

/// Generator instance for a single sound.
///
/// All synthesis state lives inside the producer thread and is discarded on
/// stop, so a restarted player begins from zeroed state. The volume gain is
/// the only value shared with the thread; it is stored as
/// `volume * PARAM_SCALER` in an atomic and picked up at each chunk.
pub struct SoundPlayer {
    source_type: SoundSourceType,
    provider: Arc<dyn SinkProvider>,
    volume: Arc<AtomicU32>,
    should_exit: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
    seed: Option<u64>,
}

impl SoundPlayer {
    pub fn new(source_type: SoundSourceType, provider: Arc<dyn SinkProvider>) -> Self {
        Self {
            source_type,
            provider,
            volume: Arc::new(AtomicU32::new((1.0 * PARAM_SCALER) as u32)),
            should_exit: Arc::new(AtomicBool::new(false)),
            handle: None,
            seed: None,
        }
    }

    /// Fixes the random seed for the next `start`, for reproducible output.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Starts the producer thread. No-op if already running. A sink that
    /// cannot be opened fails the start and leaves the player stopped.
    pub fn start(&mut self) -> Result<()> {
        if self.handle.is_some() {
            return Ok(());
        }

        self.should_exit = Arc::new(AtomicBool::new(false));
        let should_exit = self.should_exit.clone();
        let volume = self.volume.clone();
        let provider = self.provider.clone();
        let source_type = self.source_type;
        let random = match self.seed {
            Some(seed) => GaussianSource::seeded(seed),
            None => GaussianSource::from_entropy(),
        };

        // The sink is opened on the producer thread (the device stream is
        // not Send); the open result comes back over this channel so a
        // failed start is reported synchronously.
        let (ready_tx, ready_rx) = mpsc::channel::<Result<()>>();

        let handle = thread::Builder::new()
            .name(format!("sound-{:?}", source_type))
            .spawn(move || {
                let mut sink = match provider.open(SAMPLE_RATE) {
                    Ok(sink) => {
                        let _ = ready_tx.send(Ok(()));
                        sink
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };

                let mut voice = Voice::new(source_type, random);
                let mut chunk = vec![0i16; CHUNK_SIZE];

                while !should_exit.load(Ordering::Relaxed) {
                    voice.fill(&mut chunk);

                    let gain = volume.load(Ordering::Relaxed) as f32 / PARAM_SCALER;
                    for sample in chunk.iter_mut() {
                        *sample = (*sample as f32 * gain) as i16;
                    }

                    if let Err(e) = sink.write(&chunk) {
                        warn!("sink write failed, stopping producer: {}", e);
                        break;
                    }
                }
                // Dropping the sink here releases the device stream; the
                // joining stop() call observes that ordering.
            })?;

        match ready_rx.recv() {
            Ok(Ok(())) => {
                self.handle = Some(handle);
                info!("started {:?}", self.source_type);
                Ok(())
            }
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                let _ = handle.join();
                Err(anyhow::anyhow!("producer thread exited before opening sink"))
            }
        }
    }

    /// Requests cancellation and joins the producer thread, releasing the
    /// sink before returning. Idempotent.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.should_exit.store(true, Ordering::Relaxed);
            if handle.join().is_err() {
                warn!("producer thread for {:?} panicked", self.source_type);
            }
            info!("stopped {:?}", self.source_type);
        }
    }

    /// Updates the gain applied to the next chunk. Out-of-range input is
    /// clamped, never rejected.
    pub fn set_volume(&self, volume: f32) {
        let clamped = volume.clamp(0.0, 1.0);
        self.volume
            .store((clamped * PARAM_SCALER) as u32, Ordering::Relaxed);
    }

    pub fn volume(&self) -> f32 {
        self.volume.load(Ordering::Relaxed) as f32 / PARAM_SCALER
    }
}

impl Drop for SoundPlayer {
    fn drop(&mut self) {
        self.stop();
    }
}
