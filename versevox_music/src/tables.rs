// Data-driven musical configuration: scales, moods, genres, root candidates.
//
// Nothing in the composer hardcodes a scale pattern, tempo factor or genre
// multiplier; it reads them from `MusicTables`, loaded from
// `data/music_tables.json` at startup (or from caller JSON in tests).
// Lookups that can miss (`mood`, `genre`) return `Option` so the caller
// decides how to fall back and what to log.

use crate::scale::Scale;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Closed-form pitch inflection applied across each phoneme for a mood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Inflection {
    /// Slow rise, +2% at the end of the phoneme.
    Rise,
    /// Slow fall, −2% at the end of the phoneme.
    Fall,
    /// Half-sine hump peaking at +2% mid-phoneme.
    Arch,
    /// Two gentle ±1% oscillations.
    Wave,
    Flat,
}

impl Inflection {
    /// Fractional pitch offset at `progress` ∈ [0, 1]. Magnitude ≤ 0.02.
    pub fn offset(self, progress: f64) -> f64 {
        use std::f64::consts::PI;
        match self {
            Inflection::Rise => 0.02 * progress,
            Inflection::Fall => -0.02 * progress,
            Inflection::Arch => 0.02 * (PI * progress).sin(),
            Inflection::Wave => 0.01 * (4.0 * PI * progress).sin(),
            Inflection::Flat => 0.0,
        }
    }
}

/// Per-mood musical character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoodProfile {
    /// Name of an entry in `MusicTables::scales`.
    pub scale: String,
    pub tempo_modifier: f64,
    pub energy: f64,
    pub inflection: Inflection,
}

/// Per-genre composition and feature parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreProfile {
    pub duration_multiplier: f64,
    pub energy: f64,
    pub danceability: f64,
    pub acousticness: f64,
    /// Tag attached to every phoneme sung in this genre.
    pub singing_style: String,
}

/// Pitch classes offered to the key selector, by emotional sign.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootCandidates {
    pub bright: Vec<u8>,
    pub dark: Vec<u8>,
    pub neutral: Vec<u8>,
}

#[derive(Debug, Error)]
pub enum MusicTableError {
    #[error("music table JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("scale '{name}' is invalid: {reason}")]
    InvalidScale { name: String, reason: String },

    #[error("{what} '{name}' references unknown scale '{scale}'")]
    UnknownScale {
        what: &'static str,
        name: String,
        scale: String,
    },

    #[error("default {what} '{name}' is not in the table")]
    MissingDefault { what: &'static str, name: String },

    #[error("root candidate list '{0}' must be non-empty pitch classes 0-11")]
    InvalidRoots(&'static str),
}

#[derive(Debug, Deserialize)]
struct MusicTablesFile {
    default_mood: String,
    default_genre: String,
    scales: BTreeMap<String, Vec<u8>>,
    moods: BTreeMap<String, MoodProfile>,
    genres: BTreeMap<String, GenreProfile>,
    root_candidates: RootCandidates,
}

/// Immutable musical lookup tables shared read-only across requests.
#[derive(Debug, Clone)]
pub struct MusicTables {
    default_mood: String,
    default_genre: String,
    scales: BTreeMap<String, Scale>,
    moods: BTreeMap<String, MoodProfile>,
    genres: BTreeMap<String, GenreProfile>,
    root_candidates: RootCandidates,
}

impl MusicTables {
    /// Parse and cross-check the tables.
    pub fn from_json(json: &str) -> Result<Self, MusicTableError> {
        let file: MusicTablesFile = serde_json::from_str(json)?;

        let mut scales = BTreeMap::new();
        for (name, intervals) in file.scales {
            let scale = Scale::new(&name, intervals)?;
            scales.insert(name, scale);
        }

        for (name, mood) in &file.moods {
            if !scales.contains_key(&mood.scale) {
                return Err(MusicTableError::UnknownScale {
                    what: "mood",
                    name: name.clone(),
                    scale: mood.scale.clone(),
                });
            }
        }
        if !file.moods.contains_key(&file.default_mood) {
            return Err(MusicTableError::MissingDefault {
                what: "mood",
                name: file.default_mood,
            });
        }
        if !file.genres.contains_key(&file.default_genre) {
            return Err(MusicTableError::MissingDefault {
                what: "genre",
                name: file.default_genre,
            });
        }
        for (label, roots) in [
            ("bright", &file.root_candidates.bright),
            ("dark", &file.root_candidates.dark),
            ("neutral", &file.root_candidates.neutral),
        ] {
            if roots.is_empty() || roots.iter().any(|&pc| pc > 11) {
                return Err(MusicTableError::InvalidRoots(label));
            }
        }
        for fallback in ["major", "minor", "dorian"] {
            if !scales.contains_key(fallback) {
                return Err(MusicTableError::MissingDefault {
                    what: "scale",
                    name: fallback.to_string(),
                });
            }
        }

        Ok(MusicTables {
            default_mood: file.default_mood,
            default_genre: file.default_genre,
            scales,
            moods: file.moods,
            genres: file.genres,
            root_candidates: file.root_candidates,
        })
    }

    pub fn scale(&self, name: &str) -> Option<&Scale> {
        self.scales.get(name)
    }

    /// The major scale, guaranteed present by `from_json`.
    pub fn major_scale(&self) -> &Scale {
        &self.scales["major"]
    }

    pub fn mood(&self, name: &str) -> Option<&MoodProfile> {
        self.moods.get(name)
    }

    pub fn genre(&self, name: &str) -> Option<&GenreProfile> {
        self.genres.get(name)
    }

    pub fn default_mood(&self) -> (&str, &MoodProfile) {
        (&self.default_mood, &self.moods[&self.default_mood])
    }

    pub fn default_genre(&self) -> (&str, &GenreProfile) {
        (&self.default_genre, &self.genres[&self.default_genre])
    }

    /// Replace the default mood (config override). Ignored if unknown.
    pub fn set_default_mood(&mut self, name: &str) -> bool {
        if self.moods.contains_key(name) {
            self.default_mood = name.to_string();
            true
        } else {
            false
        }
    }

    /// Replace the default genre (config override). Ignored if unknown.
    pub fn set_default_genre(&mut self, name: &str) -> bool {
        if self.genres.contains_key(name) {
            self.default_genre = name.to_string();
            true
        } else {
            false
        }
    }

    pub fn root_candidates(&self) -> &RootCandidates {
        &self.root_candidates
    }

    pub fn genre_names(&self) -> impl Iterator<Item = &str> {
        self.genres.keys().map(String::as_str)
    }

    pub fn mood_names(&self) -> impl Iterator<Item = &str> {
        self.moods.keys().map(String::as_str)
    }
}

/// Load the tables embedded at compile time.
///
/// Panics if the embedded JSON is malformed (caught by the tests below).
pub fn default_tables() -> MusicTables {
    MusicTables::from_json(include_str!("../../data/music_tables.json"))
        .expect("embedded music_tables.json is malformed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_tables_load() {
        let tables = default_tables();
        assert_eq!(tables.default_mood().0, "happy");
        assert_eq!(tables.default_genre().0, "pop");
        assert_eq!(tables.mood("happy").unwrap().scale, "major");
        assert_eq!(tables.genre("ballad").unwrap().duration_multiplier, 1.2);
        assert_eq!(tables.genre("jazz").unwrap().duration_multiplier, 1.2);
        assert_eq!(tables.genre("punk").unwrap().duration_multiplier, 0.8);
        assert_eq!(tables.genre("metal").unwrap().duration_multiplier, 0.8);
        assert!(tables.mood("confused").is_none());
    }

    #[test]
    fn inflections_stay_within_two_percent() {
        for inflection in [
            Inflection::Rise,
            Inflection::Fall,
            Inflection::Arch,
            Inflection::Wave,
            Inflection::Flat,
        ] {
            for i in 0..=100 {
                let v = inflection.offset(i as f64 / 100.0);
                assert!(v.abs() <= 0.02 + 1e-12, "{inflection:?} at {i}: {v}");
            }
        }
    }

    #[test]
    fn rejects_mood_with_unknown_scale() {
        let json = r#"{
            "default_mood": "happy", "default_genre": "pop",
            "scales": {"major": [0,2,4,5,7,9,11], "minor": [0,2,3,5,7,8,10], "dorian": [0,2,3,5,7,9,10]},
            "moods": {"happy": {"scale": "ionian", "tempo_modifier": 1.0, "energy": 0.5, "inflection": "flat"}},
            "genres": {"pop": {"duration_multiplier": 1.0, "energy": 0.5, "danceability": 0.5, "acousticness": 0.5, "singing_style": "pop"}},
            "root_candidates": {"bright": [0], "dark": [9], "neutral": [5]}
        }"#;
        assert!(matches!(
            MusicTables::from_json(json),
            Err(MusicTableError::UnknownScale { .. })
        ));
    }

    #[test]
    fn default_overrides_must_exist() {
        let mut tables = default_tables();
        assert!(tables.set_default_mood("sad"));
        assert_eq!(tables.default_mood().0, "sad");
        assert!(!tables.set_default_genre("polka"));
        assert_eq!(tables.default_genre().0, "pop");
    }
}
