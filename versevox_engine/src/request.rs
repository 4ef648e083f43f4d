use serde::{Deserialize, Serialize};
use versevox_voice::HarmonyInterval;
use versevox_voice::tables::DEFAULT_PROFILE_ID;

/// One lyrics-to-vocal generation request.
///
/// Mood, genre, key and language are free text; anything the tables do not
/// know falls back to a default and is reported as a warning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub lyrics: String,
    pub genre: String,
    pub mood: String,
    /// BPM.
    pub tempo: u32,
    /// e.g. "A minor", "F# dorian", "Bb".
    #[serde(default)]
    pub key: Option<String>,
    /// Target output length in seconds.
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default = "default_profile_ref")]
    pub voice_profile_ref: String,
    #[serde(default)]
    pub language: Option<String>,
    /// Dynamic marking such as "p", "mf", "fortissimo".
    #[serde(default)]
    pub dynamics: Option<String>,
    #[serde(default)]
    pub harmony: Vec<HarmonyInterval>,
    /// Fixes every random choice. A fresh seed is drawn when absent.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_profile_ref() -> String {
    DEFAULT_PROFILE_ID.to_string()
}

impl GenerationRequest {
    pub fn new(lyrics: &str, genre: &str, mood: &str, tempo: u32) -> Self {
        GenerationRequest {
            lyrics: lyrics.to_string(),
            genre: genre.to_string(),
            mood: mood.to_string(),
            tempo,
            key: None,
            duration: None,
            voice_profile_ref: default_profile_ref(),
            language: None,
            dynamics: None,
            harmony: Vec::new(),
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_key(mut self, key: &str) -> Self {
        self.key = Some(key.to_string());
        self
    }

    pub fn with_voice(mut self, profile_ref: &str) -> Self {
        self.voice_profile_ref = profile_ref.to_string();
        self
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = Some(language.to_string());
        self
    }

    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration = Some(seconds);
        self
    }
}
