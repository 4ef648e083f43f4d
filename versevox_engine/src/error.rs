// Errors surfaced to callers, and the non-fatal warnings that travel with a
// successful result.
//
// Only missing required inputs (lyrics, voice profile) and failures at the
// renderer boundary are errors. Everything else is corrected in place,
// logged, and reported as a `GenerationWarning`.

use crate::config::ConfigError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use versevox_lang::LyricsError;
use versevox_music::{Fallback, MelodyError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoiceStoreError {
    #[error("voice profile '{id}' not found")]
    NotFound { id: String },
}

/// Failure in an `AudioRenderer`.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("render I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("plan serialization: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("renderer failed: {0}")]
    Failed(String),
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error(transparent)]
    Validation(#[from] LyricsError),

    #[error(transparent)]
    VoiceProfileNotFound(#[from] VoiceStoreError),

    #[error(transparent)]
    Melody(#[from] MelodyError),

    #[error(transparent)]
    Synthesis(#[from] RenderError),

    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
}

/// A request value that was corrected rather than rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GenerationWarning {
    #[error("tempo {requested} BPM clamped to {clamped}")]
    TempoClamped { requested: u32, clamped: u32 },

    #[error("unknown mood '{requested}', using '{fallback}'")]
    UnknownMood { requested: String, fallback: String },

    #[error("unknown genre '{requested}', using '{fallback}'")]
    UnknownGenre { requested: String, fallback: String },

    #[error("could not use key '{requested}', selecting from lyrics")]
    UnparsableKey { requested: String },

    #[error("duration {requested}s clamped to {clamped}s")]
    DurationClamped { requested: f64, clamped: f64 },

    #[error("no phoneme table for '{requested}', using '{fallback}'")]
    UnknownLanguage { requested: String, fallback: String },
}

impl From<Fallback> for GenerationWarning {
    fn from(fallback: Fallback) -> Self {
        match fallback {
            Fallback::UnknownMood {
                requested,
                fallback,
            } => GenerationWarning::UnknownMood {
                requested,
                fallback,
            },
            Fallback::UnknownGenre {
                requested,
                fallback,
            } => GenerationWarning::UnknownGenre {
                requested,
                fallback,
            },
            Fallback::UnparsableKey { requested } => GenerationWarning::UnparsableKey { requested },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_message() {
        let err = GenerationError::from(LyricsError::TooShort {
            found: 0,
            required: 10,
        });
        assert!(err.to_string().starts_with("lyrics too short"));
    }

    #[test]
    fn not_found_message() {
        let err = GenerationError::from(VoiceStoreError::NotFound { id: "alto-7".into() });
        assert_eq!(err.to_string(), "voice profile 'alto-7' not found");
    }

    #[test]
    fn fallback_conversion() {
        let warning = GenerationWarning::from(Fallback::UnknownMood {
            requested: "confused".into(),
            fallback: "happy".into(),
        });
        assert_eq!(warning.to_string(), "unknown mood 'confused', using 'happy'");
    }

    #[test]
    fn render_errors_pass_through_unchanged() {
        let err = GenerationError::from(RenderError::Failed("disk quota exceeded".into()));
        assert_eq!(err.to_string(), "renderer failed: disk quota exceeded");
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only volume");
        let render = RenderError::from(io);
        let expected = render.to_string();
        assert_eq!(GenerationError::from(render).to_string(), expected);
    }

    #[test]
    fn warning_messages() {
        let clamped = GenerationWarning::TempoClamped {
            requested: 500,
            clamped: 200,
        };
        assert_eq!(clamped.to_string(), "tempo 500 BPM clamped to 200");
        let language = GenerationWarning::UnknownLanguage {
            requested: "tlh".into(),
            fallback: "en".into(),
        };
        assert_eq!(language.to_string(), "no phoneme table for 'tlh', using 'en'");
        let key = GenerationWarning::UnparsableKey {
            requested: "H#".into(),
        };
        assert_eq!(key.to_string(), "could not use key 'H#', selecting from lyrics");
    }

    #[test]
    fn warnings_serialize_tagged() {
        let json = serde_json::to_value(GenerationWarning::TempoClamped {
            requested: 500,
            clamped: 200,
        })
        .unwrap();
        assert_eq!(json["kind"], "tempoClamped");
        assert_eq!(json["clamped"], 200);
    }
}
