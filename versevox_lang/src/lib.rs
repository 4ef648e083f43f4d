// Lyric language resources for VerseVox.
//
// Turns raw lyric text into the structured description the melody and voice
// stages consume. No audio or music knowledge lives here.
//
// Architecture:
// - `types.rs`: `Phoneme`, `PhonemeKind`, `WordAnalysis`, `LyricsAnalysis`, errors
// - `syllables.rs`: vowel-group syllable counting, syllable splitting, stress defaults
// - `analysis.rs`: the lyrics analyzer (lines, syllables, stress, emotion, rhyme)
// - `phonemes.rs`: per-language grapheme tables and the phoneme transcriber
// - `lib.rs` (this file): `Lexicon` (emotion weights, stress table, syllable exceptions)
//
// The lexicon is loaded from `data/lexicon.json` via `Lexicon::from_json()`;
// `default_lexicon()` embeds the shipped file at compile time. Tests and
// callers can pass their own JSON to override any entry.

pub mod analysis;
pub mod phonemes;
pub mod syllables;
pub mod types;

pub use analysis::{AnalyzerSettings, analyze_lyrics};
pub use phonemes::{PhonemeInventory, PhonemeTable, default_inventory};
pub use types::{LyricsAnalysis, LyricsError, Phoneme, PhonemeKind, TableError, WordAnalysis};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Word-level lookup tables used by the lyrics analyzer.
///
/// Keys are lowercase, letters only. `BTreeMap` keeps iteration order stable
/// so serialized lexicons diff cleanly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Lexicon {
    #[serde(default)]
    emotion_weights: BTreeMap<String, f64>,
    #[serde(default)]
    stress_patterns: BTreeMap<String, Vec<bool>>,
    #[serde(default)]
    syllable_exceptions: BTreeMap<String, usize>,
}

impl Lexicon {
    /// Parse and validate a lexicon from JSON.
    pub fn from_json(json: &str) -> Result<Self, TableError> {
        let lexicon: Lexicon = serde_json::from_str(json)?;
        lexicon.validate()?;
        Ok(lexicon)
    }

    fn validate(&self) -> Result<(), TableError> {
        for (word, count) in &self.syllable_exceptions {
            if *count == 0 {
                return Err(TableError::InvalidEntry {
                    key: word.clone(),
                    reason: "syllable exception must be at least 1".into(),
                });
            }
        }
        for (word, pattern) in &self.stress_patterns {
            if pattern.is_empty() {
                return Err(TableError::InvalidEntry {
                    key: word.clone(),
                    reason: "stress pattern must not be empty".into(),
                });
            }
        }
        for (word, weight) in &self.emotion_weights {
            if !(-1.0..=1.0).contains(weight) {
                return Err(TableError::InvalidEntry {
                    key: word.clone(),
                    reason: format!("emotion weight {weight} outside [-1, 1]"),
                });
            }
        }
        Ok(())
    }

    pub fn emotion_weight(&self, word: &str) -> Option<f64> {
        self.emotion_weights.get(word).copied()
    }

    pub fn stress_pattern(&self, word: &str) -> Option<&[bool]> {
        self.stress_patterns.get(word).map(Vec::as_slice)
    }

    pub fn syllable_exception(&self, word: &str) -> Option<usize> {
        self.syllable_exceptions.get(word).copied()
    }

    /// Add or replace an emotion weight (test and tuning hook).
    pub fn with_emotion_weight(mut self, word: &str, weight: f64) -> Self {
        self.emotion_weights.insert(word.to_string(), weight);
        self
    }

    /// Add or replace a syllable exception.
    pub fn with_syllable_exception(mut self, word: &str, count: usize) -> Self {
        self.syllable_exceptions.insert(word.to_string(), count.max(1));
        self
    }

    /// Iterate over the exceptions table.
    pub fn syllable_exceptions(&self) -> impl Iterator<Item = (&str, usize)> {
        self.syllable_exceptions.iter().map(|(w, c)| (w.as_str(), *c))
    }
}

/// Load the lexicon embedded at compile time.
///
/// Panics if the embedded JSON is malformed (caught by the tests below).
pub fn default_lexicon() -> Lexicon {
    let json = include_str!("../../data/lexicon.json");
    Lexicon::from_json(json).expect("embedded lexicon.json is malformed")
}
