// Vocal pipeline driver: melody → synthesis plan.
//
// Runs the voice stages in order: align, apply voice, F0, spectra,
// expressive modulation, assembly. Each stage consumes the previous one's
// output; nothing upstream is mutated. The only randomness (harmonic phases)
// comes from the caller's `VoxRng`.

use crate::align::align_melody;
use crate::assembly::{VocalSynthesisPlan, assemble};
use crate::characteristics::apply_voice;
use crate::expressive::{DEFAULT_HARMONY_BLEND, HarmonyInterval, modulate};
use crate::f0::{DEFAULT_SAMPLE_RATE, generate_f0};
use crate::profile::VoiceProfile;
use crate::spectral::{SpectralSettings, synthesize_spectra};
use crate::tables::VoiceTables;
use tracing::{debug, info};
use versevox_lang::PhonemeInventory;
use versevox_music::{GeneratedMelody, Inflection};
use versevox_prng::VoxRng;

/// Per-request voice settings.
#[derive(Debug, Clone)]
pub struct VoiceSettings {
    pub language: String,
    pub genre: String,
    pub singing_style: String,
    pub inflection: Inflection,
    pub f0_sample_rate: f64,
    pub spectral: SpectralSettings,
    pub dynamics: Option<String>,
    pub harmony: Vec<HarmonyInterval>,
    pub harmony_blend: f64,
    /// Requested output length in seconds, already clamped.
    pub target_duration: Option<f64>,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        VoiceSettings {
            language: "en".to_string(),
            genre: "pop".to_string(),
            singing_style: "pop".to_string(),
            inflection: Inflection::Flat,
            f0_sample_rate: DEFAULT_SAMPLE_RATE,
            spectral: SpectralSettings::default(),
            dynamics: None,
            harmony: Vec::new(),
            harmony_blend: DEFAULT_HARMONY_BLEND,
            target_duration: None,
        }
    }
}

pub fn synthesize_plan(
    melody: &GeneratedMelody,
    inventory: &PhonemeInventory,
    tables: &VoiceTables,
    profile: &VoiceProfile,
    settings: &VoiceSettings,
    rng: &mut VoxRng,
) -> VocalSynthesisPlan {
    let aligned = align_melody(
        melody,
        inventory,
        &settings.language,
        &settings.singing_style,
    );
    let voiced = apply_voice(aligned, profile, tables);
    let phoneme_count: usize = voiced.iter().map(|l| l.phonemes.len()).sum();
    debug!(lines = voiced.len(), phoneme_count, "phonemes aligned and voiced");

    let all = || voiced.iter().flat_map(|l| &l.phonemes);
    let f0_track = generate_f0(all(), settings.inflection, settings.f0_sample_rate);
    let timbre = tables.genre_timbre(&settings.genre);
    let spectral_features = synthesize_spectra(all(), timbre, settings.spectral, rng);
    let expressive = modulate(
        &spectral_features,
        settings.dynamics.as_deref(),
        &settings.harmony,
        settings.harmony_blend,
    );

    let plan = assemble(
        voiced,
        f0_track,
        spectral_features,
        expressive,
        timbre,
        settings.target_duration,
    );
    info!(
        phoneme_count,
        sung_duration = plan.sung_duration(),
        naturalness = plan.processing_metadata.naturalness,
        "synthesis plan assembled"
    );
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::f0::sample_count;
    use crate::tables::default_tables;
    use versevox_lang::{AnalyzerSettings, analyze_lyrics, default_inventory, default_lexicon};
    use versevox_music::{MelodyParams, generate_melody};

    fn melody(text: &str) -> GeneratedMelody {
        let analysis =
            analyze_lyrics(text, &default_lexicon(), &AnalyzerSettings::default()).unwrap();
        let params = MelodyParams {
            mood: "romantic",
            genre: "ballad",
            tempo: 80,
            tempo_range: (40, 200),
            key: None,
        };
        generate_melody(
            &analysis,
            &versevox_music::tables::default_tables(),
            &params,
            &mut VoxRng::new(21),
        )
        .unwrap()
        .melody
    }

    fn plan(settings: &VoiceSettings) -> VocalSynthesisPlan {
        let tables = default_tables();
        synthesize_plan(
            &melody("Shine on shining stars tonight\nHold me close and never let me go"),
            &default_inventory(),
            &tables,
            tables.default_profile(),
            settings,
            &mut VoxRng::new(4),
        )
    }

    #[test]
    fn plan_arrays_are_index_aligned() {
        let p = plan(&VoiceSettings::default());
        let n: usize = p.aligned_phonemes_per_line.iter().map(|l| l.phonemes.len()).sum();
        assert!(n > 0);
        assert_eq!(p.segments.len(), n);
        assert_eq!(p.f0_track.contours.len(), n);
        assert_eq!(p.spectral_features.len(), n);
        assert_eq!(p.expressive_modulation.envelopes.len(), n);
    }

    #[test]
    fn line_durations_and_f0_lengths() {
        let p = plan(&VoiceSettings::default());
        let phonemes = p.aligned_phonemes_per_line.iter().flat_map(|l| &l.phonemes);
        for (phoneme, contour) in phonemes.zip(&p.f0_track.contours) {
            assert_eq!(contour.len(), sample_count(phoneme.duration(), 100.0));
        }
        for line in &p.aligned_phonemes_per_line {
            let total: f64 = line.phonemes.iter().map(|ph| ph.duration()).sum();
            assert!((total - (line.end_time - line.start_time)).abs() < 1e-6);
        }
    }

    #[test]
    fn segments_are_in_playback_order() {
        let p = plan(&VoiceSettings::default());
        for pair in p.segments.windows(2) {
            assert!(pair[1].start_time >= pair[0].start_time);
        }
    }

    #[test]
    fn settings_flow_into_mix() {
        let settings = VoiceSettings {
            genre: "classical".into(),
            dynamics: Some("ff".into()),
            harmony: vec![HarmonyInterval::Fifth, HarmonyInterval::Octave],
            target_duration: Some(30.0),
            ..VoiceSettings::default()
        };
        let p = plan(&settings);
        let tables = default_tables();
        assert_eq!(p.mix_parameters.compression.ratio, 6.0);
        assert_eq!(
            p.mix_parameters.reverb.room_size,
            tables.genre_timbre("classical").reverb.room_size
        );
        assert_eq!(p.mix_parameters.final_mix.output_duration, 30.0);
        assert_eq!(p.expressive_modulation.harmony.len(), 2);
        assert!((p.expressive_modulation.dynamics.level - 0.7 * 1.6).abs() < 1e-12);

        let default = plan(&VoiceSettings::default());
        assert_eq!(
            default.mix_parameters.final_mix.output_duration,
            default.sung_duration()
        );
    }

    #[test]
    fn same_seed_same_plan() {
        assert_eq!(plan(&VoiceSettings::default()), plan(&VoiceSettings::default()));
    }
}
