// Voice profiles: the singer's timbre as the synthesis stages see it.
//
// A profile is either the generic default (built from the voice tables) or a
// cloned voice measured elsewhere and handed in as JSON. Only cloned profiles
// contribute their own formants; default profiles use the table formants.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One resonance band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Formant {
    /// Center frequency in Hz.
    pub frequency: f64,
    /// Bandwidth in Hz.
    pub bandwidth: f64,
    pub amplitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectralEnvelope {
    /// Hz.
    pub centroid: f64,
    /// Hz.
    pub rolloff: f64,
    /// 0 = tonal, 1 = noise-like.
    pub flatness: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vibrato {
    /// Oscillations per unit of phoneme progress.
    pub rate: f64,
    /// Fraction of the pitch target.
    pub depth: f64,
    /// Progress (0..1) after which vibrato starts.
    pub onset: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceOrigin {
    Default,
    Cloned,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceProfile {
    pub id: String,
    #[serde(default)]
    pub formants: Vec<Formant>,
    pub spectral_envelope: SpectralEnvelope,
    pub vibrato: Vibrato,
    #[serde(default)]
    pub breathiness: f64,
    pub origin: VoiceOrigin,
}

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("voice profile JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("voice profile '{id}' is invalid: {reason}")]
    Invalid { id: String, reason: String },
}

impl VoiceProfile {
    /// Parse and validate a profile from JSON.
    pub fn from_json(json: &str) -> Result<Self, ProfileError> {
        let profile: VoiceProfile = serde_json::from_str(json)?;
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> Result<(), ProfileError> {
        let invalid = |reason: &str| ProfileError::Invalid {
            id: self.id.clone(),
            reason: reason.to_string(),
        };
        if self.origin == VoiceOrigin::Cloned && self.formants.is_empty() {
            return Err(invalid("cloned profiles need at least one formant"));
        }
        if self
            .formants
            .iter()
            .any(|f| f.frequency <= 0.0 || f.bandwidth <= 0.0 || f.amplitude < 0.0)
        {
            return Err(invalid("formants need positive frequency and bandwidth"));
        }
        if !(0.0..=1.0).contains(&self.spectral_envelope.flatness) {
            return Err(invalid("spectral flatness must lie in [0, 1]"));
        }
        if self.vibrato.rate < 0.0 || self.vibrato.depth < 0.0 {
            return Err(invalid("vibrato rate and depth must be non-negative"));
        }
        if !(0.0..=1.0).contains(&self.vibrato.onset) {
            return Err(invalid("vibrato onset must lie in [0, 1]"));
        }
        Ok(())
    }

    pub fn is_cloned(&self) -> bool {
        self.origin == VoiceOrigin::Cloned
    }
}
