// src/noise.rs

//! Noise-color synthesis kernels: white, pink, brown, blue.
//!
//! Each kernel fills a chunk of i16 samples from a private Gaussian source.
//! Amplitude scales and clamp ranges are design constants for the intended
//! timbre, not tunables.

use crate::random::GaussianSource;
use crate::catalog::SoundSourceType;

const PINK_ROWS: usize = 16;

/// Pink noise state: Voss-McCartney rows plus the running sum.
#[derive(Debug, Clone, Copy, Default)]
struct PinkState {
    rows: [i32; PINK_ROWS],
    running_sum: i32,
    index: u32,
}

/// One noise voice. Fresh construction starts from all-zero filter state, so
/// two voices built with the same seeded source produce identical output.
#[derive(Debug)]
pub struct NoiseKernel {
    color: SoundSourceType,
    random: GaussianSource,
    pink: PinkState,
    brown_last: f64,
}

impl NoiseKernel {
    pub fn new(color: SoundSourceType, random: GaussianSource) -> Self {
        debug_assert!(color.is_noise());
        Self {
            color,
            random,
            pink: PinkState::default(),
            brown_last: 0.0,
        }
    }

    /// Synthesizes one chunk into `buffer`.
    pub fn fill(&mut self, buffer: &mut [i16]) {
        match self.color {
            SoundSourceType::NoisePink => self.fill_pink(buffer),
            SoundSourceType::NoiseBrown => self.fill_brown(buffer),
            SoundSourceType::NoiseBlue => self.fill_blue(buffer),
            _ => self.fill_white(buffer),
        }
    }

    fn fill_white(&mut self, buffer: &mut [i16]) {
        for sample in buffer.iter_mut() {
            *sample = clip(self.random.next_gaussian() * 4000.0);
        }
    }

    /// Voss-McCartney: the trailing-zero count of a circular index selects
    /// which of the 16 rows gets a fresh random value each sample.
    fn fill_pink(&mut self, buffer: &mut [i16]) {
        for sample in buffer.iter_mut() {
            self.pink.index = (self.pink.index + 1) % 65_536;
            let row = (self.pink.index.trailing_zeros() as usize).min(PINK_ROWS - 1);

            let fresh = (self.random.next_gaussian() * 500.0) as i32;
            self.pink.running_sum -= self.pink.rows[row];
            self.pink.running_sum += fresh;
            self.pink.rows[row] = fresh;

            let white = (self.random.next_gaussian() * 500.0) as i32;
            let pink = (self.pink.running_sum + white) / 4;
            *sample = clip(pink as f64);
        }
    }

    fn fill_brown(&mut self, buffer: &mut [i16]) {
        for sample in buffer.iter_mut() {
            self.brown_last += self.random.next_gaussian() * 200.0;
            // Clamp the random walk to prevent unbounded drift.
            self.brown_last = self.brown_last.clamp(-16_000.0, 16_000.0);
            *sample = clip(self.brown_last);
        }
    }

    /// First difference of white noise (high-frequency emphasis). The
    /// previous-sample register restarts at zero each chunk.
    fn fill_blue(&mut self, buffer: &mut [i16]) {
        let mut prev = 0.0;
        for sample in buffer.iter_mut() {
            let white = self.random.next_gaussian() * 4000.0;
            *sample = clip((white - prev) * 0.5);
            prev = white;
        }
    }
}

/// Saturating f64 -> i16 conversion shared by all kernels.
#[inline]
pub fn clip(value: f64) -> i16 {
    value.clamp(i16::MIN as f64, i16::MAX as f64) as i16
}
