// Audio assembler: the per-phoneme descriptions become one ordered
// synthesis plan with mix settings attached.
//
// The plan is the end of the core pipeline. It names every phoneme in
// playback order (line by line), carries the F0, spectral and expressive
// data index-aligned with that order, and adds EQ, compression, reverb and
// final-mix settings. Rendering samples from it is the renderer's job.

use crate::characteristics::VoicedLine;
use crate::expressive::ExpressiveModulation;
use crate::f0::F0Track;
use crate::spectral::SpectralFeature;
use crate::tables::GenreTimbre;
use serde::{Deserialize, Serialize};
use versevox_lang::PhonemeKind;

const FORTE_RATIO: f64 = 6.0;
const DEFAULT_RATIO: f64 = 4.0;
const COMPRESSOR_THRESHOLD_DB: f64 = -18.0;
const COMPRESSOR_ATTACK_MS: f64 = 5.0;
const COMPRESSOR_RELEASE_MS: f64 = 50.0;
const MASTER_VOLUME: f64 = 0.85;
const STEREO_WIDTH: f64 = 1.0;
const LIMITER_CEILING_DB: f64 = -0.3;

/// Gains in dB.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EqSettings {
    pub low_gain_db: f64,
    pub mid_gain_db: f64,
    pub high_gain_db: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Compression {
    pub ratio: f64,
    pub threshold_db: f64,
    pub attack_ms: f64,
    pub release_ms: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reverb {
    pub room_size: f64,
    pub decay_seconds: f64,
    pub wet: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalMix {
    pub master_volume: f64,
    pub stereo_width: f64,
    pub limiter_ceiling_db: f64,
    /// Seconds of audio the renderer should produce.
    pub output_duration: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MixParameters {
    pub eq: EqSettings,
    pub compression: Compression,
    pub reverb: Reverb,
    pub final_mix: FinalMix,
}

/// Scores in [0, 1] describing how well the plan covers its input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingMetadata {
    /// Share of phonemes found in a phoneme table.
    pub phonetic_accuracy: f64,
    /// Share of phonemes with at least one sounding note.
    pub melody_alignment: f64,
    /// 1 − coefficient of variation of vowel F1.
    pub voice_consistency: f64,
    pub naturalness: f64,
}

/// One phoneme's slot in playback order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisSegment {
    pub line_index: usize,
    pub phoneme_index: usize,
    pub symbol: String,
    pub start_time: f64,
    pub end_time: f64,
    /// Hz.
    pub pitch_target: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocalSynthesisPlan {
    pub aligned_phonemes_per_line: Vec<VoicedLine>,
    pub segments: Vec<SynthesisSegment>,
    pub f0_track: F0Track,
    pub spectral_features: Vec<SpectralFeature>,
    pub expressive_modulation: ExpressiveModulation,
    pub mix_parameters: MixParameters,
    pub processing_metadata: ProcessingMetadata,
}

impl VocalSynthesisPlan {
    /// End of the last phoneme, 0 for an empty plan.
    pub fn sung_duration(&self) -> f64 {
        self.aligned_phonemes_per_line
            .last()
            .map_or(0.0, |line| line.end_time)
    }
}

pub fn mix_parameters(
    timbre: &GenreTimbre,
    forte: bool,
    output_duration: f64,
) -> MixParameters {
    MixParameters {
        eq: EqSettings {
            low_gain_db: timbre.eq.low,
            mid_gain_db: timbre.eq.mid,
            high_gain_db: timbre.eq.high,
        },
        compression: Compression {
            ratio: if forte { FORTE_RATIO } else { DEFAULT_RATIO },
            threshold_db: COMPRESSOR_THRESHOLD_DB,
            attack_ms: COMPRESSOR_ATTACK_MS,
            release_ms: COMPRESSOR_RELEASE_MS,
        },
        reverb: Reverb {
            room_size: timbre.reverb.room_size,
            decay_seconds: timbre.reverb.decay,
            wet: timbre.reverb.wet,
        },
        final_mix: FinalMix {
            master_volume: MASTER_VOLUME,
            stereo_width: STEREO_WIDTH,
            limiter_ceiling_db: LIMITER_CEILING_DB,
            output_duration,
        },
    }
}

pub fn processing_metadata(lines: &[VoicedLine]) -> ProcessingMetadata {
    let phonemes: Vec<_> = lines.iter().flat_map(|l| &l.phonemes).collect();
    let total = phonemes.len();
    let share = |count: usize| {
        if total == 0 {
            0.0
        } else {
            count as f64 / total as f64
        }
    };

    let known = phonemes
        .iter()
        .filter(|p| p.aligned.phoneme.kind != PhonemeKind::Unknown)
        .count();
    let with_notes = phonemes
        .iter()
        .filter(|p| !p.aligned.melody_notes.is_empty())
        .count();

    let f1: Vec<f64> = phonemes
        .iter()
        .filter(|p| p.is_vowel())
        .filter_map(|p| p.formants.first().map(|f| f.frequency))
        .collect();
    let voice_consistency = if f1.len() < 2 {
        1.0
    } else {
        let mean = f1.iter().sum::<f64>() / f1.len() as f64;
        let variance = f1.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / f1.len() as f64;
        let cv = if mean > 0.0 { variance.sqrt() / mean } else { 1.0 };
        (1.0 - cv).clamp(0.0, 1.0)
    };

    let phonetic_accuracy = share(known);
    let melody_alignment = share(with_notes);
    ProcessingMetadata {
        phonetic_accuracy,
        melody_alignment,
        voice_consistency,
        naturalness: (phonetic_accuracy + melody_alignment + voice_consistency) / 3.0,
    }
}

/// Put the plan together. `f0_track`, `spectral_features` and the
/// expressive envelopes must follow the phoneme order of `lines`.
pub fn assemble(
    lines: Vec<VoicedLine>,
    f0_track: F0Track,
    spectral_features: Vec<SpectralFeature>,
    expressive_modulation: ExpressiveModulation,
    timbre: &GenreTimbre,
    target_duration: Option<f64>,
) -> VocalSynthesisPlan {
    let segments = lines
        .iter()
        .flat_map(|line| {
            line.phonemes
                .iter()
                .enumerate()
                .map(move |(i, p)| SynthesisSegment {
                    line_index: line.line_index,
                    phoneme_index: i,
                    symbol: p.aligned.phoneme.symbol.clone(),
                    start_time: p.aligned.start_time,
                    end_time: p.aligned.end_time,
                    pitch_target: p.aligned.pitch_target,
                })
        })
        .collect();

    let sung = lines.last().map_or(0.0, |l| l.end_time);
    let output_duration = target_duration.unwrap_or(sung);
    let processing_metadata = processing_metadata(&lines);
    let mix_parameters = mix_parameters(
        timbre,
        expressive_modulation.dynamics.forte,
        output_duration,
    );

    VocalSynthesisPlan {
        aligned_phonemes_per_line: lines,
        segments,
        f0_track,
        spectral_features,
        expressive_modulation,
        mix_parameters,
        processing_metadata,
    }
}
