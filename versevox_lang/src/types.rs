// Core language types shared by the analysis and transcription stages.
//
// - `PhonemeKind`: closed set of phoneme categories (vowel, nasal, ...)
// - `Phoneme`: one transcribed sound with its nominal duration
// - `WordAnalysis`: a lyric word with syllables, stress and emotion weight
// - `LyricsAnalysis`: the per-line result of `analysis::analyze_lyrics`
// - `LyricsError` / `TableError`: the two failure modes of this crate
//
// All output structs serialize with camelCase field names because they end
// up inside the generation response.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Category of a phoneme, used by every downstream stage to pick timing,
/// envelope, noise and vibrato behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhonemeKind {
    Vowel,
    Consonant,
    Nasal,
    Fricative,
    Plosive,
    Liquid,
    Glide,
    Affricate,
    Unknown,
}

impl PhonemeKind {
    pub fn is_vowel(self) -> bool {
        self == PhonemeKind::Vowel
    }

    /// Voiced sonorants carry pitch almost as well as vowels.
    pub fn is_sonorant(self) -> bool {
        matches!(
            self,
            PhonemeKind::Vowel | PhonemeKind::Nasal | PhonemeKind::Liquid | PhonemeKind::Glide
        )
    }
}

/// A single transcribed sound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phoneme {
    /// IPA-ish symbol (`"aɪ"`, `"ʃ"`), or the raw letter for unknown input.
    pub symbol: String,
    /// Nominal duration in seconds, used as a relative weight by the aligner.
    pub base_duration: f64,
    #[serde(rename = "type")]
    pub kind: PhonemeKind,
    /// Singing style tag inherited from the genre (`"belt"`, `"legato"`, ...).
    pub singing_style: String,
}

impl Phoneme {
    pub fn is_vowel(&self) -> bool {
        self.kind.is_vowel()
    }

    /// Long vowels and diphthongs (`iː`, `aɪ`): any vowel written with more
    /// than one symbol character.
    pub fn is_extended(&self) -> bool {
        self.is_vowel() && self.symbol.chars().count() > 1
    }
}

/// One analyzed lyric word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordAnalysis {
    /// Normalized (lowercase, letters only) text.
    pub text: String,
    /// Syllable labels; always `stress.len()` entries.
    pub syllables: Vec<String>,
    pub stress: Vec<bool>,
    pub emotion: f64,
}

/// Structured analysis of a block of lyrics.
///
/// Every per-line vector has exactly `lines.len()` entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LyricsAnalysis {
    pub lines: Vec<String>,
    pub emotional_arc: Vec<f64>,
    pub syllable_counts: Vec<usize>,
    pub total_syllables: usize,
    pub rhyme_scheme: Vec<String>,
    pub stress_patterns: Vec<Vec<bool>>,
    pub words: Vec<Vec<WordAnalysis>>,
}

impl LyricsAnalysis {
    /// Mean of the emotional arc, 0.0 for empty input.
    pub fn average_emotion(&self) -> f64 {
        if self.emotional_arc.is_empty() {
            return 0.0;
        }
        self.emotional_arc.iter().sum::<f64>() / self.emotional_arc.len() as f64
    }
}

/// Rejected lyric input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LyricsError {
    #[error("lyrics too short: {found} non-whitespace characters, at least {required} required")]
    TooShort { found: usize, required: usize },
}

/// Malformed lexicon or phoneme table data.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("table JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid table entry '{key}': {reason}")]
    InvalidEntry { key: String, reason: String },

    #[error("phoneme inventory is missing the '{0}' fallback table")]
    MissingFallback(String),
}
