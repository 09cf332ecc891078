// src/voice.rs

//! Closed dispatch over the 18 source types: a voice is either a noise
//! kernel or an ambience kernel, selected from the descriptor tag.

use crate::ambience::AmbienceKernel;
use crate::catalog::SoundSourceType;
use crate::noise::NoiseKernel;
use crate::random::GaussianSource;

#[derive(Debug)]
pub enum Voice {
    Noise(NoiseKernel),
    Ambience(AmbienceKernel),
}

impl Voice {
    /// Builds a fresh voice with all-zero synthesis state.
    pub fn new(source_type: SoundSourceType, random: GaussianSource) -> Self {
        if source_type.is_noise() {
            Voice::Noise(NoiseKernel::new(source_type, random))
        } else {
            Voice::Ambience(AmbienceKernel::new(source_type, random))
        }
    }

    /// Synthesizes one chunk into `buffer`.
    pub fn fill(&mut self, buffer: &mut [i16]) {
        match self {
            Voice::Noise(kernel) => kernel.fill(buffer),
            Voice::Ambience(kernel) => kernel.fill(buffer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noise_tags_build_noise_voices() {
        let voice = Voice::new(SoundSourceType::NoisePink, GaussianSource::seeded(0));
        assert!(matches!(voice, Voice::Noise(_)));
        let voice = Voice::new(SoundSourceType::SyntheticCafe, GaussianSource::seeded(0));
        assert!(matches!(voice, Voice::Ambience(_)));
    }

    #[test]
    fn restarted_voice_reproduces_first_chunk() {
        // Stop zeroes everything by discarding the voice; a rebuilt voice
        // with the same seed must reproduce the very first chunk even after
        // the old voice had advanced well past it.
        let mut initial = vec![0i16; 1024];
        let mut voice = Voice::new(SoundSourceType::SyntheticOcean, GaussianSource::seeded(21));
        voice.fill(&mut initial);

        let mut scratch = vec![0i16; 1024];
        for _ in 0..3 {
            voice.fill(&mut scratch);
        }
        drop(voice);

        let mut restarted = vec![0i16; 1024];
        let mut voice = Voice::new(SoundSourceType::SyntheticOcean, GaussianSource::seeded(21));
        voice.fill(&mut restarted);
        assert_eq!(restarted, initial);
    }
}
