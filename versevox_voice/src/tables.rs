// Voice and mix lookup tables, loaded from `data/voice_tables.json`.
//
// - default profile: the generic voice (four formants, envelope, vibrato)
// - vowel shifts: per-vowel F1/F2/amplitude multipliers
// - spectral multipliers: per-symbol boosts with per-kind defaults
// - genres: spectral tilt (brightness/warmth), noise scale, EQ and reverb
//
// Everything here is read-only after load and shared across requests.

use crate::profile::{Formant, SpectralEnvelope, Vibrato, VoiceOrigin, VoiceProfile};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use versevox_lang::{Phoneme, PhonemeKind};

/// Id given to the generic profile built from these tables.
pub const DEFAULT_PROFILE_ID: &str = "default";

/// Multipliers applied to the first two formants of a vowel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VowelShift {
    pub f1: f64,
    pub f2: f64,
    /// Applied to every formant amplitude.
    pub amplitude: f64,
}

impl VowelShift {
    pub const IDENTITY: VowelShift = VowelShift {
        f1: 1.0,
        f2: 1.0,
        amplitude: 1.0,
    };
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpectralMultipliers {
    #[serde(default)]
    pub symbols: BTreeMap<String, f64>,
    #[serde(default)]
    pub kinds: BTreeMap<PhonemeKind, f64>,
    pub default: f64,
}

/// Gains in dB.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EqBands {
    pub low: f64,
    pub mid: f64,
    pub high: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReverbPreset {
    pub room_size: f64,
    /// Seconds.
    pub decay: f64,
    pub wet: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenreTimbre {
    /// Gain applied to spectral bins above 3 kHz.
    pub brightness: f64,
    /// Gain applied to spectral bins below 1 kHz.
    pub warmth: f64,
    pub noise_scale: f64,
    pub eq: EqBands,
    pub reverb: ReverbPreset,
}

#[derive(Debug, Clone, Deserialize)]
struct DefaultProfileFile {
    formants: Vec<Formant>,
    spectral_envelope: SpectralEnvelope,
    vibrato: Vibrato,
    breathiness: f64,
}

#[derive(Debug, Deserialize)]
struct VoiceTablesFile {
    default_genre: String,
    default_profile: DefaultProfileFile,
    vowel_shifts: BTreeMap<String, VowelShift>,
    spectral_multipliers: SpectralMultipliers,
    genres: BTreeMap<String, GenreTimbre>,
}

#[derive(Debug, Error)]
pub enum VoiceTableError {
    #[error("voice table JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("default genre '{0}' has no timbre entry")]
    MissingDefaultGenre(String),

    #[error("the default profile needs exactly four formants, found {0}")]
    DefaultFormants(usize),
}

#[derive(Debug, Clone)]
pub struct VoiceTables {
    default_genre: String,
    default_profile: VoiceProfile,
    vowel_shifts: BTreeMap<String, VowelShift>,
    spectral_multipliers: SpectralMultipliers,
    genres: BTreeMap<String, GenreTimbre>,
}

impl VoiceTables {
    pub fn from_json(json: &str) -> Result<Self, VoiceTableError> {
        let file: VoiceTablesFile = serde_json::from_str(json)?;
        if !file.genres.contains_key(&file.default_genre) {
            return Err(VoiceTableError::MissingDefaultGenre(file.default_genre));
        }
        if file.default_profile.formants.len() != 4 {
            return Err(VoiceTableError::DefaultFormants(
                file.default_profile.formants.len(),
            ));
        }
        let default_profile = VoiceProfile {
            id: DEFAULT_PROFILE_ID.to_string(),
            formants: file.default_profile.formants,
            spectral_envelope: file.default_profile.spectral_envelope,
            vibrato: file.default_profile.vibrato,
            breathiness: file.default_profile.breathiness,
            origin: VoiceOrigin::Default,
        };
        Ok(VoiceTables {
            default_genre: file.default_genre,
            default_profile,
            vowel_shifts: file.vowel_shifts,
            spectral_multipliers: file.spectral_multipliers,
            genres: file.genres,
        })
    }

    /// The generic voice.
    pub fn default_profile(&self) -> &VoiceProfile {
        &self.default_profile
    }

    /// F1..F4 of the generic voice.
    pub fn default_formants(&self) -> &[Formant] {
        &self.default_profile.formants
    }

    /// Shift for a vowel symbol: exact match, then its first character,
    /// otherwise identity.
    pub fn vowel_shift(&self, symbol: &str) -> VowelShift {
        if let Some(shift) = self.vowel_shifts.get(symbol) {
            return *shift;
        }
        let first: String = symbol.chars().take(1).collect();
        self.vowel_shifts
            .get(&first)
            .copied()
            .unwrap_or(VowelShift::IDENTITY)
    }

    /// Spectral multiplier for a phoneme: symbol entry, then kind entry,
    /// then the table default.
    pub fn spectral_multiplier(&self, phoneme: &Phoneme) -> f64 {
        let table = &self.spectral_multipliers;
        table
            .symbols
            .get(&phoneme.symbol)
            .or_else(|| table.kinds.get(&phoneme.kind))
            .copied()
            .unwrap_or(table.default)
    }

    /// Timbre for a genre, falling back to the default genre's.
    pub fn genre_timbre(&self, genre: &str) -> &GenreTimbre {
        self.genres
            .get(genre)
            .unwrap_or_else(|| &self.genres[&self.default_genre])
    }

    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.contains_key(genre)
    }
}

/// Load the tables embedded at compile time.
///
/// Panics if the embedded JSON is malformed (caught by the tests below).
pub fn default_tables() -> VoiceTables {
    VoiceTables::from_json(include_str!("../../data/voice_tables.json"))
        .expect("embedded voice_tables.json is malformed")
}
