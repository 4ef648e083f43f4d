// Spectral feature synthesis: formants → sampled spectral envelope, plus
// a harmonic series and a noise component per phoneme.
//
// Envelope: `bins` evenly spaced bins over [0, max_hz). Each formant adds a
// Gaussian bump `amplitude × exp(-(d / bandwidth)²)` to bins within three
// bandwidths of its center. The genre timbre then scales bins above 3 kHz
// (brightness) and below 1 kHz (warmth).
//
// Harmonics follow a fixed decaying amplitude series. Partial k sits at
// `f0·k·(1 + B·k²)`, with the stiffness B larger for noisy consonants.
// Phases are drawn from the request's `VoxRng`.

use crate::characteristics::VoicedPhoneme;
use crate::tables::GenreTimbre;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use versevox_lang::PhonemeKind;
use versevox_prng::VoxRng;

pub const HARMONIC_RATIOS: [f64; 8] = [1.0, 0.8, 0.6, 0.4, 0.3, 0.2, 0.15, 0.1];

const BRIGHTNESS_FLOOR_HZ: f64 = 3000.0;
const WARMTH_CEILING_HZ: f64 = 1000.0;
/// Formants only reach this many bandwidths from their center.
const FORMANT_REACH: f64 = 3.0;
const FRICATIVE_CUTOFF_HZ: f64 = 2000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpectralSettings {
    pub bins: usize,
    pub max_hz: f64,
}

impl Default for SpectralSettings {
    fn default() -> Self {
        SpectralSettings {
            bins: 512,
            max_hz: 44_100.0,
        }
    }
}

impl SpectralSettings {
    pub fn bin_width(&self) -> f64 {
        self.max_hz / self.bins.max(1) as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Harmonic {
    /// 1-based partial number.
    pub number: u32,
    /// Hz.
    pub frequency: f64,
    pub amplitude: f64,
    /// Radians in [0, 2π).
    pub phase: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NoiseShape {
    White,
    #[serde(rename_all = "camelCase")]
    HighPass { cutoff_hz: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoiseComponent {
    pub level: f64,
    pub shape: NoiseShape,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpectralFeature {
    #[serde(rename = "type")]
    pub kind: PhonemeKind,
    pub bin_width_hz: f64,
    pub envelope: Vec<f64>,
    pub inharmonicity: f64,
    pub harmonics: Vec<Harmonic>,
    pub noise: NoiseComponent,
}

/// Stiffness coefficient B for a phoneme kind.
pub fn inharmonicity(kind: PhonemeKind) -> f64 {
    match kind {
        PhonemeKind::Vowel => 0.001,
        PhonemeKind::Fricative
        | PhonemeKind::Plosive
        | PhonemeKind::Affricate
        | PhonemeKind::Unknown => 0.02,
        _ => 0.005,
    }
}

/// Unscaled noise level for a phoneme kind.
pub fn noise_level(kind: PhonemeKind) -> f64 {
    match kind {
        PhonemeKind::Fricative => 0.3,
        PhonemeKind::Affricate => 0.2,
        PhonemeKind::Plosive => 0.15,
        _ => 0.05,
    }
}

pub fn spectral_feature(
    phoneme: &VoicedPhoneme,
    timbre: &GenreTimbre,
    settings: SpectralSettings,
    rng: &mut VoxRng,
) -> SpectralFeature {
    let kind = phoneme.aligned.phoneme.kind;
    let bin_width = settings.bin_width();

    let envelope: Vec<f64> = (0..settings.bins)
        .map(|bin| {
            let freq = bin as f64 * bin_width;
            let mut amplitude: f64 = phoneme
                .formants
                .iter()
                .filter_map(|f| {
                    let distance = (freq - f.frequency).abs();
                    (distance <= FORMANT_REACH * f.bandwidth)
                        .then(|| f.amplitude * (-(distance / f.bandwidth).powi(2)).exp())
                })
                .sum();
            if freq > BRIGHTNESS_FLOOR_HZ {
                amplitude *= timbre.brightness;
            } else if freq < WARMTH_CEILING_HZ {
                amplitude *= timbre.warmth;
            }
            amplitude
        })
        .collect();

    let f0 = phoneme.aligned.pitch_target;
    let b = inharmonicity(kind);
    let harmonics = HARMONIC_RATIOS
        .iter()
        .enumerate()
        .map(|(i, &ratio)| {
            let k = (i + 1) as f64;
            Harmonic {
                number: (i + 1) as u32,
                frequency: f0 * k * (1.0 + b * k * k),
                amplitude: ratio,
                phase: rng.range_f64(0.0, 2.0 * PI),
            }
        })
        .collect();

    let shape = if kind == PhonemeKind::Fricative {
        NoiseShape::HighPass {
            cutoff_hz: FRICATIVE_CUTOFF_HZ,
        }
    } else {
        NoiseShape::White
    };

    SpectralFeature {
        kind,
        bin_width_hz: bin_width,
        envelope,
        inharmonicity: b,
        harmonics,
        noise: NoiseComponent {
            level: noise_level(kind) * timbre.noise_scale,
            shape,
        },
    }
}

pub fn synthesize_spectra<'a>(
    phonemes: impl IntoIterator<Item = &'a VoicedPhoneme>,
    timbre: &GenreTimbre,
    settings: SpectralSettings,
    rng: &mut VoxRng,
) -> Vec<SpectralFeature> {
    phonemes
        .into_iter()
        .map(|p| spectral_feature(p, timbre, settings, rng))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::{AlignedPhoneme, SyllablePosition};
    use crate::characteristics::{PhonemeSpectrum, SingingAdjustments};
    use crate::profile::{Formant, Vibrato};
    use crate::tables::{EqBands, ReverbPreset, default_tables};
    use versevox_lang::Phoneme;

    fn voiced(kind: PhonemeKind, formants: Vec<Formant>) -> VoicedPhoneme {
        VoicedPhoneme {
            aligned: AlignedPhoneme {
                phoneme: Phoneme {
                    symbol: "x".into(),
                    base_duration: 0.1,
                    kind,
                    singing_style: "pop".into(),
                },
                start_time: 0.0,
                end_time: 0.2,
                melody_notes: vec![],
                pitch_target: 220.0,
                syllable_position: SyllablePosition::Nucleus,
            },
            formants,
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
            vibrato: Vibrato {
                rate: 5.5,
                depth: 0.03,
                onset: 0.2,
            },
        }
    }

    fn neutral_timbre() -> GenreTimbre {
        GenreTimbre {
            brightness: 1.0,
            warmth: 1.0,
            noise_scale: 1.0,
            eq: EqBands {
                low: 0.0,
                mid: 0.0,
                high: 0.0,
            },
            reverb: ReverbPreset {
                room_size: 0.0,
                decay: 0.0,
                wet: 0.0,
            },
        }
    }

    #[test]
    fn envelope_shape() {
        let settings = SpectralSettings::default();
        let width = settings.bin_width();
        // Center a formant exactly on bin 20.
        let formant = Formant {
            frequency: 20.0 * width,
            bandwidth: 100.0,
            amplitude: 1.0,
        };
        let p = voiced(PhonemeKind::Vowel, vec![formant]);
        let f = spectral_feature(&p, &neutral_timbre(), settings, &mut VoxRng::new(1));
        assert_eq!(f.envelope.len(), 512);
        assert!((f.bin_width_hz - 44_100.0 / 512.0).abs() < 1e-12);
        assert!((f.envelope[20] - 1.0).abs() < 1e-12);
        let expected = (-(width / 100.0f64).powi(2)).exp();
        assert!((f.envelope[21] - expected).abs() < 1e-12);
        // Four bins away is past three bandwidths.
        assert_eq!(f.envelope[24], 0.0);
    }

    #[test]
    fn genre_tilt_applies_by_band() {
        let settings = SpectralSettings::default();
        let formants = vec![
            Formant {
                frequency: 500.0,
                bandwidth: 200.0,
                amplitude: 1.0,
            },
            Formant {
                frequency: 4000.0,
                bandwidth: 200.0,
                amplitude: 1.0,
            },
        ];
        let p = voiced(PhonemeKind::Vowel, formants);
        let plain = spectral_feature(&p, &neutral_timbre(), settings, &mut VoxRng::new(1));
        let tilted_timbre = GenreTimbre {
            brightness: 2.0,
            warmth: 0.5,
            ..neutral_timbre()
        };
        let tilted = spectral_feature(&p, &tilted_timbre, settings, &mut VoxRng::new(1));
        let bin_500 = (500.0 / settings.bin_width()) as usize;
        let bin_4k = (4000.0 / settings.bin_width()) as usize;
        assert!((tilted.envelope[bin_500] - plain.envelope[bin_500] * 0.5).abs() < 1e-12);
        assert!((tilted.envelope[bin_4k] - plain.envelope[bin_4k] * 2.0).abs() < 1e-12);
    }

    #[test]
    fn harmonics_and_inharmonicity() {
        let p = voiced(PhonemeKind::Vowel, vec![]);
        let f = spectral_feature(
            &p,
            &neutral_timbre(),
            SpectralSettings::default(),
            &mut VoxRng::new(3),
        );
        assert_eq!(f.harmonics.len(), 8);
        let amps: Vec<f64> = f.harmonics.iter().map(|h| h.amplitude).collect();
        assert_eq!(amps, HARMONIC_RATIOS.to_vec());
        assert!((f.harmonics[1].frequency - 220.0 * 2.0 * 1.004).abs() < 1e-9);
        assert!(f.harmonics.iter().all(|h| (0.0..2.0 * PI).contains(&h.phase)));
        assert!(inharmonicity(PhonemeKind::Fricative) > inharmonicity(PhonemeKind::Nasal));
        assert!(inharmonicity(PhonemeKind::Nasal) > inharmonicity(PhonemeKind::Vowel));
    }

    #[test]
    fn noise_by_kind() {
        let tables = default_tables();
        let timbre = *tables.genre_timbre("metal");
        let settings = SpectralSettings::default();
        let mut rng = VoxRng::new(9);
        let fric = spectral_feature(&voiced(PhonemeKind::Fricative, vec![]), &timbre, settings, &mut rng);
        let plos = spectral_feature(&voiced(PhonemeKind::Plosive, vec![]), &timbre, settings, &mut rng);
        let vowel = spectral_feature(&voiced(PhonemeKind::Vowel, vec![]), &timbre, settings, &mut rng);
        assert!((fric.noise.level - 0.3 * timbre.noise_scale).abs() < 1e-12);
        assert!(fric.noise.level > plos.noise.level);
        assert!(plos.noise.level > vowel.noise.level);
        assert_eq!(fric.noise.shape, NoiseShape::HighPass { cutoff_hz: 2000.0 });
        assert_eq!(plos.noise.shape, NoiseShape::White);
    }

    #[test]
    fn phases_follow_seed() {
        let p = voiced(PhonemeKind::Vowel, vec![]);
        let settings = SpectralSettings::default();
        let a = spectral_feature(&p, &neutral_timbre(), settings, &mut VoxRng::new(5));
        let b = spectral_feature(&p, &neutral_timbre(), settings, &mut VoxRng::new(5));
        assert_eq!(a, b);
    }
}
