// src/random.rs

//! Gaussian pseudo-random sample source feeding every synthesis kernel.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Standard-normal sample source (mean 0, variance 1) over any `rand` RNG.
///
/// Uses the Marsaglia polar variant of the Box-Muller transform and caches
/// the spare value, so it draws two uniforms for every two samples. Each
/// generator voice owns a private instance; nothing here is shared between
/// threads.
#[derive(Debug, Clone)]
pub struct GaussianSource<R: Rng = StdRng> {
    rng: R,
    spare: Option<f64>,
}

impl GaussianSource<StdRng> {
    /// Entropy-seeded source for normal playback.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Deterministic source for tests and reproducibility checks.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> GaussianSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng, spare: None }
    }

    /// Next standard-normal sample.
    pub fn next_gaussian(&mut self) -> f64 {
        if let Some(spare) = self.spare.take() {
            return spare;
        }
        loop {
            let u = self.rng.gen::<f64>() * 2.0 - 1.0;
            let v = self.rng.gen::<f64>() * 2.0 - 1.0;
            let s = u * u + v * v;
            if s > 0.0 && s < 1.0 {
                let scale = (-2.0 * s.ln() / s).sqrt();
                self.spare = Some(v * scale);
                return u * scale;
            }
        }
    }

    /// Uniform sample in `[0, 1)`, used for event scheduling.
    pub fn next_uniform(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }
}
