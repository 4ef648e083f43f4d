// Voice characteristics: aligned phonemes + a voice profile → per-phoneme
// formants, spectral shape, singing adjustments and vibrato.
//
// Formants start from the profile (cloned voices) or the table defaults
// (generic voice). Vowels then get their F1/F2 nudged by the vowel-shift
// table. Spectral centroid/rolloff scale with the per-phoneme spectral
// multiplier, so sibilants come out brightest.

use crate::align::{AlignedLine, AlignedPhoneme};
use crate::profile::{Formant, Vibrato, VoiceProfile};
use crate::tables::VoiceTables;
use serde::{Deserialize, Serialize};
use tracing::debug;

const EXTENDED_RESONANCE_BOOST: f64 = 1.3;
const CONSONANT_ARTICULATION: f64 = 1.2;
const CONSONANT_SUSTAIN: f64 = 0.3;
const CONSONANT_VIBRATO_DEPTH: f64 = 0.1;
const EXTENDED_VIBRATO_DEPTH: f64 = 1.5;
const EXTENDED_VIBRATO_ONSET: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhonemeSpectrum {
    /// Hz.
    pub centroid: f64,
    /// Hz.
    pub rolloff: f64,
    pub brightness: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingingAdjustments {
    pub resonance_boost: f64,
    pub articulation_clarity: f64,
    pub sustainability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoicedPhoneme {
    #[serde(flatten)]
    pub aligned: AlignedPhoneme,
    pub formants: Vec<Formant>,
    pub spectrum: PhonemeSpectrum,
    pub singing: SingingAdjustments,
    pub vibrato: Vibrato,
}

impl VoicedPhoneme {
    pub fn duration(&self) -> f64 {
        self.aligned.duration()
    }

    pub fn is_vowel(&self) -> bool {
        self.aligned.phoneme.is_vowel()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoicedLine {
    pub line_index: usize,
    pub lyric_line: String,
    pub start_time: f64,
    pub end_time: f64,
    pub phonemes: Vec<VoicedPhoneme>,
}

pub fn apply_voice(
    lines: Vec<AlignedLine>,
    profile: &VoiceProfile,
    tables: &VoiceTables,
) -> Vec<VoicedLine> {
    let base_formants: &[Formant] = if profile.is_cloned() && !profile.formants.is_empty() {
        &profile.formants
    } else {
        tables.default_formants()
    };
    debug!(
        profile = %profile.id,
        cloned = profile.is_cloned(),
        formants = base_formants.len(),
        "applying voice characteristics"
    );

    lines
        .into_iter()
        .map(|line| VoicedLine {
            line_index: line.line_index,
            lyric_line: line.lyric_line,
            start_time: line.start_time,
            end_time: line.end_time,
            phonemes: line
                .phonemes
                .into_iter()
                .map(|aligned| voice_phoneme(aligned, base_formants, profile, tables))
                .collect(),
        })
        .collect()
}

fn voice_phoneme(
    aligned: AlignedPhoneme,
    base_formants: &[Formant],
    profile: &VoiceProfile,
    tables: &VoiceTables,
) -> VoicedPhoneme {
    let phoneme = &aligned.phoneme;
    let vowel = phoneme.is_vowel();
    let extended = phoneme.is_extended();

    let mut formants = base_formants.to_vec();
    if vowel {
        let shift = tables.vowel_shift(&phoneme.symbol);
        for (i, formant) in formants.iter_mut().enumerate() {
            match i {
                0 => formant.frequency *= shift.f1,
                1 => formant.frequency *= shift.f2,
                _ => {}
            }
            formant.amplitude *= shift.amplitude;
        }
    }

    let envelope = profile.spectral_envelope;
    let multiplier = tables.spectral_multiplier(phoneme);
    let spectrum = PhonemeSpectrum {
        centroid: envelope.centroid * multiplier,
        rolloff: envelope.rolloff * multiplier,
        brightness: multiplier * (1.0 - envelope.flatness / 2.0),
    };

    let singing = SingingAdjustments {
        resonance_boost: if extended { EXTENDED_RESONANCE_BOOST } else { 1.0 },
        articulation_clarity: if vowel { 1.0 } else { CONSONANT_ARTICULATION },
        sustainability: if vowel { 1.0 } else { CONSONANT_SUSTAIN },
    };

    let base = profile.vibrato;
    let vibrato = if !vowel {
        Vibrato {
            depth: base.depth * CONSONANT_VIBRATO_DEPTH,
            ..base
        }
    } else if extended {
        Vibrato {
            depth: base.depth * EXTENDED_VIBRATO_DEPTH,
            onset: base.onset.max(EXTENDED_VIBRATO_ONSET),
            ..base
        }
    } else {
        base
    };

    VoicedPhoneme {
        aligned,
        formants,
        spectrum,
        singing,
        vibrato,
    }
}
