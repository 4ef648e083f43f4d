// Expressive modulation: dynamics, per-phoneme amplitude envelopes and
// harmony voices.

use crate::spectral::SpectralFeature;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use versevox_lang::PhonemeKind;

/// Mezzo-forte output level.
pub const BASE_LEVEL: f64 = 0.7;
pub const DEFAULT_HARMONY_BLEND: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dynamics {
    pub multiplier: f64,
    pub level: f64,
    /// Loud markings (f, ff) ask the compressor for a higher ratio.
    pub forte: bool,
}

/// Level multiplier for a dynamic marking; unknown or missing markings are
/// neutral.
pub fn dynamics_multiplier(marking: Option<&str>) -> f64 {
    match marking.map(str::to_ascii_lowercase).as_deref() {
        Some("pp" | "pianissimo") => 0.35,
        Some("p" | "piano") => 0.5,
        Some("mp" | "mezzo-piano") => 0.85,
        Some("f" | "forte") => 1.3,
        Some("ff" | "fortissimo") => 1.6,
        _ => 1.0,
    }
}

pub fn dynamics(marking: Option<&str>) -> Dynamics {
    let multiplier = dynamics_multiplier(marking);
    Dynamics {
        multiplier,
        level: BASE_LEVEL * multiplier,
        forte: multiplier > 1.0,
    }
}

/// ADSR envelope; times in seconds, sustain as a level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub attack: f64,
    pub decay: f64,
    pub sustain: f64,
    pub release: f64,
}

const VOWEL_ENVELOPE: Envelope = Envelope {
    attack: 0.08,
    decay: 0.10,
    sustain: 0.85,
    release: 0.15,
};

const CONSONANT_ENVELOPE: Envelope = Envelope {
    attack: 0.01,
    decay: 0.03,
    sustain: 0.30,
    release: 0.02,
};

pub fn envelope_for(kind: PhonemeKind) -> Envelope {
    if kind.is_vowel() {
        VOWEL_ENVELOPE
    } else {
        CONSONANT_ENVELOPE
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HarmonyInterval {
    Third,
    Fifth,
    MinorSeventh,
    Octave,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown harmony interval '{0}'")]
pub struct UnknownInterval(pub String);

impl FromStr for HarmonyInterval {
    type Err = UnknownInterval;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "third" | "3rd" => Ok(HarmonyInterval::Third),
            "fifth" | "5th" => Ok(HarmonyInterval::Fifth),
            "minor_seventh" | "minor-seventh" | "m7" | "min7" => Ok(HarmonyInterval::MinorSeventh),
            "octave" | "8va" => Ok(HarmonyInterval::Octave),
            _ => Err(UnknownInterval(s.to_string())),
        }
    }
}

impl HarmonyInterval {
    pub fn semitones(self) -> i32 {
        match self {
            HarmonyInterval::Third => 4,
            HarmonyInterval::Fifth => 7,
            HarmonyInterval::MinorSeventh => 10,
            HarmonyInterval::Octave => 12,
        }
    }

    /// dB per octave applied to the harmony voice's spectrum.
    pub fn spectral_tilt_db(self) -> f64 {
        match self {
            HarmonyInterval::Third => -1.0,
            HarmonyInterval::Fifth => -1.5,
            HarmonyInterval::MinorSeventh => -2.0,
            HarmonyInterval::Octave => -3.0,
        }
    }

    /// Multiplier on the harmony voice's formant frequencies.
    pub fn formant_shift(self) -> f64 {
        match self {
            HarmonyInterval::Third => 1.02,
            HarmonyInterval::Fifth => 1.03,
            HarmonyInterval::MinorSeventh => 0.98,
            HarmonyInterval::Octave => 1.05,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarmonyVoice {
    pub interval: HarmonyInterval,
    pub semitones: i32,
    pub amplitude: f64,
    pub spectral_tilt_db: f64,
    pub formant_shift: f64,
}

pub fn harmony_voices(intervals: &[HarmonyInterval], blend: f64) -> Vec<HarmonyVoice> {
    if intervals.is_empty() {
        return Vec::new();
    }
    let amplitude = blend / intervals.len() as f64;
    intervals
        .iter()
        .map(|&interval| HarmonyVoice {
            interval,
            semitones: interval.semitones(),
            amplitude,
            spectral_tilt_db: interval.spectral_tilt_db(),
            formant_shift: interval.formant_shift(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpressiveModulation {
    pub dynamics: Dynamics,
    /// One per spectral feature, in plan order.
    pub envelopes: Vec<Envelope>,
    pub harmony: Vec<HarmonyVoice>,
}

pub fn modulate(
    features: &[SpectralFeature],
    marking: Option<&str>,
    harmony: &[HarmonyInterval],
    blend: f64,
) -> ExpressiveModulation {
    ExpressiveModulation {
        dynamics: dynamics(marking),
        envelopes: features.iter().map(|f| envelope_for(f.kind)).collect(),
        harmony: harmony_voices(harmony, blend),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marking_multipliers() {
        assert_eq!(dynamics_multiplier(Some("piano")), 0.5);
        assert_eq!(dynamics_multiplier(Some("FORTE")), 1.3);
        assert_eq!(dynamics_multiplier(Some("fortissimo")), 1.6);
        assert_eq!(dynamics_multiplier(Some("pp")), 0.35);
        assert_eq!(dynamics_multiplier(Some("sforzando")), 1.0);
        assert_eq!(dynamics_multiplier(None), 1.0);
        let d = dynamics(Some("forte"));
        assert!((d.level - 0.91).abs() < 1e-12);
        assert!(d.forte);
        assert!(!dynamics(None).forte);
    }

    #[test]
    fn vowel_envelopes_are_slower() {
        let v = envelope_for(PhonemeKind::Vowel);
        let c = envelope_for(PhonemeKind::Plosive);
        assert!(v.attack > c.attack);
        assert!(v.release > c.release);
        assert!(v.sustain > c.sustain);
    }

    #[test]
    fn harmony_amplitude_split() {
        let voices = harmony_voices(&[HarmonyInterval::Third, HarmonyInterval::Fifth], 0.3);
        assert_eq!(voices.len(), 2);
        assert_eq!(voices[0].semitones, 4);
        assert_eq!(voices[1].semitones, 7);
        assert!(voices.iter().all(|v| (v.amplitude - 0.15).abs() < 1e-12));
        assert!(harmony_voices(&[], 0.3).is_empty());
    }

    #[test]
    fn interval_parsing() {
        assert_eq!("3rd".parse::<HarmonyInterval>(), Ok(HarmonyInterval::Third));
        assert_eq!("Octave".parse::<HarmonyInterval>(), Ok(HarmonyInterval::Octave));
        assert_eq!("m7".parse::<HarmonyInterval>().map(HarmonyInterval::semitones), Ok(10));
        assert!("tritone".parse::<HarmonyInterval>().is_err());
    }
}
