// src/engine.rs

//! Mix session manager: tracks the set of concurrently playing sounds,
//! routes volume changes, and enforces the concurrency cap.

use anyhow::Result;
use log::warn;
use std::collections::HashMap;
use std::sync::Arc;

use crate::catalog::{ActiveSound, Sound};
use crate::output::CpalSinkProvider;
use crate::player::SoundPlayer;
use crate::sink::SinkProvider;

/// Hard cap on concurrent generator instances. Attempts beyond it are
/// refused, not queued.
pub const MAX_SIMULTANEOUS_SOUNDS: usize = 5;

/// The mix session. Explicitly constructed and passed by the embedding
/// application; all mutation happens from the caller's control thread, the
/// producer threads only observe the per-player volume atomics.
///
/// Invariant: `players` and `active` always hold identical key sets, and
/// never more than [`MAX_SIMULTANEOUS_SOUNDS`] entries.
pub struct SoundEngine {
    provider: Arc<dyn SinkProvider>,
    players: HashMap<String, SoundPlayer>,
    active: HashMap<String, ActiveSound>,
    paused: HashMap<String, ActiveSound>,
}

impl SoundEngine {
    /// Engine backed by the default audio device.
    pub fn new() -> Self {
        Self::with_provider(Arc::new(CpalSinkProvider::default()))
    }

    /// Engine backed by a caller-supplied sink provider (tests, alternate
    /// devices).
    pub fn with_provider(provider: Arc<dyn SinkProvider>) -> Self {
        Self {
            provider,
            players: HashMap::new(),
            active: HashMap::new(),
            paused: HashMap::new(),
        }
    }

    /// Read-only projection of the currently playing sounds.
    pub fn active_sounds(&self) -> Vec<ActiveSound> {
        self.active.values().cloned().collect()
    }

    pub fn is_playing(&self) -> bool {
        !self.players.is_empty()
    }

    pub fn is_sound_active(&self, sound_id: &str) -> bool {
        self.active.contains_key(sound_id)
    }

    pub fn has_paused_sounds(&self) -> bool {
        !self.paused.is_empty()
    }

    /// Stops the sound if it is playing (returning `Ok(false)`), otherwise
    /// starts it. Returns `Ok(true)` when the sound is now playing,
    /// `Ok(false)` when it was stopped or refused for capacity.
    pub fn toggle_sound(&mut self, sound: &Sound, initial_volume: f32) -> Result<bool> {
        if self.active.contains_key(&sound.id) {
            self.stop_sound(&sound.id);
            return Ok(false);
        }
        if self.active.len() >= MAX_SIMULTANEOUS_SOUNDS {
            return Ok(false);
        }
        self.start_sound(sound, initial_volume)
    }

    /// Starts a sound. `Ok(false)` if it is already active or the session is
    /// at capacity; `Err` only if the output sink could not be acquired, in
    /// which case no state is recorded for the sound.
    pub fn start_sound(&mut self, sound: &Sound, volume: f32) -> Result<bool> {
        if self.active.contains_key(&sound.id) {
            return Ok(false);
        }
        if self.active.len() >= MAX_SIMULTANEOUS_SOUNDS {
            return Ok(false);
        }

        let volume = volume.clamp(0.0, 1.0);
        let mut player = SoundPlayer::new(sound.source_type, self.provider.clone());
        player.set_volume(volume);
        player.start()?;

        self.players.insert(sound.id.clone(), player);
        self.active.insert(
            sound.id.clone(),
            ActiveSound {
                sound: sound.clone(),
                volume,
            },
        );
        Ok(true)
    }

    /// Stops and removes a sound. Silent no-op if it is not active.
    pub fn stop_sound(&mut self, sound_id: &str) {
        if let Some(mut player) = self.players.remove(sound_id) {
            player.stop();
        }
        self.active.remove(sound_id);
    }

    /// Updates a playing sound's volume (clamped to `[0, 1]`). Silent no-op
    /// if the sound is not active.
    pub fn set_volume(&mut self, sound_id: &str, volume: f32) {
        let Some(active) = self.active.get_mut(sound_id) else {
            return;
        };
        let volume = volume.clamp(0.0, 1.0);
        active.volume = volume;
        if let Some(player) = self.players.get(sound_id) {
            player.set_volume(volume);
        }
    }

    /// Snapshots the current mix into the paused set, then stops everything.
    pub fn pause_all(&mut self) {
        let snapshot = self.active.clone();
        self.stop_all();
        self.paused = snapshot;
    }

    /// Restarts every paused sound at its previous volume. A sound that
    /// fails to restart is dropped with a warning; the rest still resume.
    pub fn resume_all(&mut self) {
        let paused = std::mem::take(&mut self.paused);
        for (_, active) in paused {
            if let Err(e) = self.start_sound(&active.sound, active.volume) {
                warn!("failed to resume {}: {}", active.sound.id, e);
            }
        }
    }

    /// Stops every playing sound. Leaves the paused set untouched.
    pub fn stop_all(&mut self) {
        for (_, mut player) in self.players.drain() {
            player.stop();
        }
        self.active.clear();
    }
}

impl Default for SoundEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SoundEngine {
    fn drop(&mut self) {
        self.stop_all();
    }
}
