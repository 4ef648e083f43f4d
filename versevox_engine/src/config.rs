// Engine configuration, loaded once at startup from TOML.
//
// Every field has a default, so an empty file (or no file at all) gives the
// stock engine. Table paths are optional overrides for the JSON data that is
// otherwise embedded in the library crates; see resources.rs for loading.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use versevox_lang::TableError;
use versevox_music::MusicTableError;
use versevox_voice::{ProfileError, VoiceTableError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("lexicon or phoneme table: {0}")]
    Lexicon(#[from] TableError),

    #[error("music tables: {0}")]
    Music(#[from] MusicTableError),

    #[error("voice tables: {0}")]
    Voice(#[from] VoiceTableError),

    #[error("voice profile: {0}")]
    Profile(#[from] ProfileError),

    #[error("default {kind} '{name}' is not in the music tables")]
    UnknownDefault { kind: &'static str, name: String },
}

/// Optional replacements for the embedded JSON tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TablePaths {
    pub lexicon: Option<PathBuf>,
    pub music: Option<PathBuf>,
    pub voice: Option<PathBuf>,
    /// Phoneme tables, one file per language. When non-empty these replace
    /// the embedded inventory entirely, so an English table is required.
    pub phonemes: Vec<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Inclusive tempo bounds in BPM; requests outside are clamped.
    pub tempo_min: u32,
    pub tempo_max: u32,
    /// Lyrics with fewer non-whitespace characters are rejected.
    pub min_lyric_chars: usize,
    /// Inclusive bounds in seconds for a requested output duration.
    pub duration_min: f64,
    pub duration_max: f64,
    pub default_mood: String,
    pub default_genre: String,
    pub default_language: String,
    pub rhyme_suffix_len: usize,
    /// F0 samples per second.
    pub f0_sample_rate: f64,
    pub spectral_bins: usize,
    pub spectral_max_hz: f64,
    /// Total amplitude shared among harmony voices.
    pub harmony_blend: f64,
    pub tables: TablePaths,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            tempo_min: 40,
            tempo_max: 200,
            min_lyric_chars: 10,
            duration_min: 10.0,
            duration_max: 300.0,
            default_mood: "happy".to_string(),
            default_genre: "pop".to_string(),
            default_language: "en".to_string(),
            rhyme_suffix_len: 2,
            f0_sample_rate: 100.0,
            spectral_bins: 512,
            spectral_max_hz: 44_100.0,
            harmony_blend: 0.3,
            tables: TablePaths::default(),
        }
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&content)?;
        config.resolve_table_paths(path.parent().unwrap_or(Path::new("")));
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tempo_min == 0 || self.tempo_min > self.tempo_max {
            return Err(ConfigError::Invalid(format!(
                "tempo bounds [{}, {}] are empty or include 0",
                self.tempo_min, self.tempo_max
            )));
        }
        if !(self.duration_min > 0.0 && self.duration_min <= self.duration_max) {
            return Err(ConfigError::Invalid(format!(
                "duration bounds [{}, {}] are empty",
                self.duration_min, self.duration_max
            )));
        }
        if self.rhyme_suffix_len == 0 {
            return Err(ConfigError::Invalid("rhyme_suffix_len must be at least 1".into()));
        }
        if self.f0_sample_rate <= 0.0 {
            return Err(ConfigError::Invalid("f0_sample_rate must be positive".into()));
        }
        if self.spectral_bins == 0 || self.spectral_max_hz <= 0.0 {
            return Err(ConfigError::Invalid(
                "spectral_bins and spectral_max_hz must be positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.harmony_blend) {
            return Err(ConfigError::Invalid(format!(
                "harmony_blend {} outside [0, 1]",
                self.harmony_blend
            )));
        }
        Ok(())
    }

    /// Clamp a requested tempo into the configured bounds.
    pub fn clamp_tempo(&self, tempo: u32) -> u32 {
        tempo.clamp(self.tempo_min, self.tempo_max)
    }

    pub fn clamp_duration(&self, seconds: f64) -> f64 {
        seconds.clamp(self.duration_min, self.duration_max)
    }

    // Relative table paths are taken relative to the config file.
    fn resolve_table_paths(&mut self, base: &Path) {
        let resolve = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        let tables = &mut self.tables;
        tables.lexicon.iter_mut().for_each(resolve);
        tables.music.iter_mut().for_each(resolve);
        tables.voice.iter_mut().for_each(resolve);
        tables.phonemes.iter_mut().for_each(resolve);
    }
}
