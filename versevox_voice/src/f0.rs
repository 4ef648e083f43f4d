// F0 contour generation.
//
// Each voiced phoneme is sampled at `sample_rate` points per second of its
// duration. Every sample starts at the phoneme's pitch target and adds:
// - a glide: vowels swell by up to 2% mid-phoneme, others droop by up to 1%
// - vibrato once progress passes the phoneme's vibrato onset
// - the mood's inflection curve (at most 2%)
// All terms are closed-form, so contours are deterministic.

use crate::characteristics::VoicedPhoneme;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use versevox_music::Inflection;

pub const DEFAULT_SAMPLE_RATE: f64 = 100.0;

const VOWEL_GLIDE: f64 = 0.02;
const CONSONANT_GLIDE: f64 = 0.01;

/// Pitch samples of every phoneme, in plan order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct F0Track {
    /// Samples per second.
    pub sample_rate: f64,
    pub contours: Vec<Vec<f64>>,
}

/// Number of samples for a phoneme of `duration` seconds.
pub fn sample_count(duration: f64, sample_rate: f64) -> usize {
    (duration * sample_rate).ceil().max(0.0) as usize
}

pub fn phoneme_contour(phoneme: &VoicedPhoneme, inflection: Inflection, sample_rate: f64) -> Vec<f64> {
    let samples = sample_count(phoneme.duration(), sample_rate);
    let target = phoneme.aligned.pitch_target;
    let vowel = phoneme.is_vowel();
    let vibrato = phoneme.vibrato;

    (0..samples)
        .map(|i| {
            let progress = i as f64 / samples as f64;
            let mut f0 = target;
            if vowel {
                f0 += target * (progress * PI).sin() * VOWEL_GLIDE;
            } else {
                f0 -= target * progress * CONSONANT_GLIDE;
            }
            if progress > vibrato.onset {
                let phase = (progress - vibrato.onset) * vibrato.rate * 2.0 * PI;
                f0 += phase.sin() * vibrato.depth * target;
            }
            f0 + target * inflection.offset(progress)
        })
        .collect()
}

pub fn generate_f0<'a>(
    phonemes: impl IntoIterator<Item = &'a VoicedPhoneme>,
    inflection: Inflection,
    sample_rate: f64,
) -> F0Track {
    F0Track {
        sample_rate,
        contours: phonemes
            .into_iter()
            .map(|p| phoneme_contour(p, inflection, sample_rate))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::{AlignedPhoneme, SyllablePosition};
    use crate::characteristics::{PhonemeSpectrum, SingingAdjustments};
    use crate::profile::Vibrato;
    use versevox_lang::{Phoneme, PhonemeKind};

    fn voiced(kind: PhonemeKind, duration: f64, vibrato: Vibrato) -> VoicedPhoneme {
        VoicedPhoneme {
            aligned: AlignedPhoneme {
                phoneme: Phoneme {
                    symbol: "a".into(),
                    base_duration: 0.1,
                    kind,
                    singing_style: "pop".into(),
                },
                start_time: 1.0,
                end_time: 1.0 + duration,
                melody_notes: vec![],
                pitch_target: 200.0,
                syllable_position: SyllablePosition::Nucleus,
            },
            formants: vec![],
            spectrum: PhonemeSpectrum {
                centroid: 1.0,
                rolloff: 1.0,
                brightness: 1.0,
            },
            singing: SingingAdjustments {
                resonance_boost: 1.0,
                articulation_clarity: 1.0,
                sustainability: 1.0,
            },
            vibrato,
        }
    }

    const NO_VIBRATO: Vibrato = Vibrato {
        rate: 5.5,
        depth: 0.0,
        onset: 0.2,
    };

    #[test]
    fn sample_count_matches_duration() {
        for d in [0.0, 0.013, 0.1, 0.257, 0.3, 1.999] {
            let p = voiced(PhonemeKind::Vowel, d, NO_VIBRATO);
            let c = phoneme_contour(&p, Inflection::Arch, DEFAULT_SAMPLE_RATE);
            assert_eq!(c.len(), (p.duration() * 100.0).ceil() as usize);
        }
    }

    #[test]
    fn vowel_glide_swells_consonant_droops() {
        let vowel = voiced(PhonemeKind::Vowel, 0.5, NO_VIBRATO);
        let c = phoneme_contour(&vowel, Inflection::Flat, DEFAULT_SAMPLE_RATE);
        assert_eq!(c[0], 200.0);
        assert!((c[25] - 204.0).abs() < 1e-9);

        let cons = voiced(PhonemeKind::Plosive, 0.5, NO_VIBRATO);
        let c = phoneme_contour(&cons, Inflection::Flat, DEFAULT_SAMPLE_RATE);
        assert!((c[25] - 199.0).abs() < 1e-9);
        assert!(c.windows(2).all(|w| w[1] < w[0]));
    }

    #[test]
    fn vibrato_starts_after_onset() {
        let vib = Vibrato {
            rate: 5.5,
            depth: 0.05,
            onset: 0.5,
        };
        let with = phoneme_contour(&voiced(PhonemeKind::Vowel, 1.0, vib), Inflection::Flat, 100.0);
        let without =
            phoneme_contour(&voiced(PhonemeKind::Vowel, 1.0, NO_VIBRATO), Inflection::Flat, 100.0);
        assert_eq!(with[..=50], without[..=50]);
        assert!(with[51..].iter().zip(&without[51..]).any(|(a, b)| (a - b).abs() > 1e-6));
        for (a, b) in with.iter().zip(&without) {
            assert!((a - b).abs() <= 0.05 * 200.0 + 1e-9);
        }
    }

    #[test]
    fn inflection_is_added() {
        let p = voiced(PhonemeKind::Plosive, 1.0, NO_VIBRATO);
        let flat = phoneme_contour(&p, Inflection::Flat, 100.0);
        let rise = phoneme_contour(&p, Inflection::Rise, 100.0);
        assert!((rise[50] - flat[50] - 200.0 * 0.01).abs() < 1e-9);
    }

    #[test]
    fn track_keeps_order() {
        let a = voiced(PhonemeKind::Vowel, 0.1, NO_VIBRATO);
        let b = voiced(PhonemeKind::Vowel, 0.3, NO_VIBRATO);
        let track = generate_f0([&a, &b], Inflection::Wave, 100.0);
        assert_eq!(track.contours.len(), 2);
        assert_eq!(track.contours[0].len(), sample_count(a.duration(), 100.0));
        assert_eq!(track.contours[1].len(), sample_count(b.duration(), 100.0));
    }
}
