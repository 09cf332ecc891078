// src/catalog.rs

//! Static catalog of sound descriptors consumed by the engine and the UI layer.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCategory {
    Noise,
    Nature,
    Ambient,
    Mechanical,
    Transport,
}

impl SoundCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            SoundCategory::Noise => "Noise",
            SoundCategory::Nature => "Nature",
            SoundCategory::Ambient => "Ambient",
            SoundCategory::Mechanical => "Mechanical",
            SoundCategory::Transport => "Transport",
        }
    }

    pub const ALL: [SoundCategory; 5] = [
        SoundCategory::Noise,
        SoundCategory::Nature,
        SoundCategory::Ambient,
        SoundCategory::Mechanical,
        SoundCategory::Transport,
    ];
}

/// Which synthesis kernel a sound runs on. Closed set: four noise colors
/// plus fourteen synthetic ambiences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundSourceType {
    NoiseWhite,
    NoisePink,
    NoiseBrown,
    NoiseBlue,
    SyntheticRain,
    SyntheticOcean,
    SyntheticForest,
    SyntheticWind,
    SyntheticFireplace,
    SyntheticThunder,
    SyntheticBirds,
    SyntheticCrickets,
    SyntheticCity,
    SyntheticCafe,
    SyntheticFan,
    SyntheticAc,
    SyntheticTrain,
    SyntheticAirplane,
}

impl SoundSourceType {
    pub fn is_noise(&self) -> bool {
        matches!(
            self,
            SoundSourceType::NoiseWhite
                | SoundSourceType::NoisePink
                | SoundSourceType::NoiseBrown
                | SoundSourceType::NoiseBlue
        )
    }
}

/// Immutable sound descriptor. Constructed once at catalog load and handed
/// out by reference; the engine clones it into the active-sound shadow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sound {
    pub id: String,
    pub name: String,
    pub category: SoundCategory,
    pub is_premium: bool,
    pub source_type: SoundSourceType,
}

fn sound(
    id: &str,
    name: &str,
    category: SoundCategory,
    is_premium: bool,
    source_type: SoundSourceType,
) -> Sound {
    Sound {
        id: id.to_string(),
        name: name.to_string(),
        category,
        is_premium,
        source_type,
    }
}

static ALL_SOUNDS: Lazy<Vec<Sound>> = Lazy::new(|| {
    use SoundCategory::*;
    use SoundSourceType::*;
    vec![
        // Noise
        sound("white_noise", "White Noise", Noise, false, NoiseWhite),
        sound("pink_noise", "Pink Noise", Noise, false, NoisePink),
        sound("brown_noise", "Brown Noise", Noise, false, NoiseBrown),
        sound("blue_noise", "Blue Noise", Noise, true, NoiseBlue),
        // Nature
        sound("rain", "Rain", Nature, false, SyntheticRain),
        sound("ocean", "Ocean Waves", Nature, false, SyntheticOcean),
        sound("forest", "Forest", Nature, false, SyntheticForest),
        sound("wind", "Wind", Nature, false, SyntheticWind),
        sound("fireplace", "Fireplace", Nature, false, SyntheticFireplace),
        sound("thunder", "Thunder", Nature, true, SyntheticThunder),
        sound("birds", "Birds", Nature, true, SyntheticBirds),
        sound("crickets", "Crickets", Nature, true, SyntheticCrickets),
        // Ambient
        sound("city", "City", Ambient, true, SyntheticCity),
        sound("cafe", "Cafe", Ambient, true, SyntheticCafe),
        // Mechanical
        sound("fan", "Fan", Mechanical, true, SyntheticFan),
        sound("ac", "AC", Mechanical, true, SyntheticAc),
        // Transport
        sound("train", "Train", Transport, true, SyntheticTrain),
        sound("airplane", "Airplane", Transport, true, SyntheticAirplane),
    ]
});

pub fn all_sounds() -> &'static [Sound] {
    &ALL_SOUNDS
}

pub fn sound_by_id(id: &str) -> Option<&'static Sound> {
    ALL_SOUNDS.iter().find(|s| s.id == id)
}

/// Catalog entries for one category, in declaration order.
pub fn sounds_in_category(category: SoundCategory) -> Vec<&'static Sound> {
    ALL_SOUNDS.iter().filter(|s| s.category == category).collect()
}

pub fn free_sounds() -> Vec<&'static Sound> {
    ALL_SOUNDS.iter().filter(|s| !s.is_premium).collect()
}

pub fn premium_sounds() -> Vec<&'static Sound> {
    ALL_SOUNDS.iter().filter(|s| s.is_premium).collect()
}

/// Externally visible shadow of a playing sound: descriptor plus the volume
/// the mixer currently applies. Distinct from the player's internal state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveSound {
    pub sound: Sound,
    pub volume: f32,
}

/// Initial volume used when the caller does not pick one.
pub const DEFAULT_VOLUME: f32 = 0.7;
