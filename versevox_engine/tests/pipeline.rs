// End-to-end tests: lyrics in, melody and synthesis plan out, through the
// public service API with the embedded tables.
//
// Every request pins its seed so failures reproduce.

use versevox_engine::{
    AudioRenderer, EngineConfig, EngineResources, GenerationError, GenerationRequest,
    GenerationWarning, InMemoryVoiceStore, JsonPlanRenderer, RenderError, VocalGenerationService,
    VoiceStoreError,
};
use versevox_voice::{HarmonyInterval, VocalSynthesisPlan};

const SHINE: &str = "Shine on shining stars tonight\nShine on shining stars so bright";

fn service() -> VocalGenerationService<InMemoryVoiceStore> {
    let resources = EngineResources::embedded();
    let store = InMemoryVoiceStore::with_default(&resources.voice);
    VocalGenerationService::new(EngineConfig::default(), resources, store)
}

fn shine(tempo: u32) -> GenerationRequest {
    GenerationRequest::new(SHINE, "pop", "happy", tempo).with_seed(2024)
}

struct FailingRenderer;

impl AudioRenderer for FailingRenderer {
    fn render(&self, _name: &str, _plan: &VocalSynthesisPlan) -> Result<String, RenderError> {
        Err(RenderError::Failed("disk quota exceeded".into()))
    }
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn shine_on_two_rhyming_phrases_in_major() {
    let result = service().generate(&shine(120)).unwrap();

    assert_eq!(result.analysis.rhyme_scheme, vec!["a", "a"]);
    assert_eq!(result.melody.phrases.len(), 2);
    assert!(result.warnings.is_empty());

    assert_eq!(result.scale.scale.name, "major");
    let notes = result.melody.phrases.iter().flat_map(|p| &p.notes);
    for note in notes {
        assert!(result.scale.is_in_scale(note.pitch), "pitch {} off scale", note.pitch);
        assert!((0.1..=2.0).contains(&note.duration));
        assert!((40..=127).contains(&note.velocity));
    }
    // happy: 120 × 1.1
    assert_eq!(result.melody.metadata.tempo, 132);
}

#[test]
fn note_count_matches_stress_patterns() {
    let result = service().generate(&shine(120)).unwrap();
    for (i, phrase) in result.melody.phrases.iter().enumerate() {
        let stressed: usize = result.analysis.words[i].iter().map(|w| w.stress.len()).sum();
        assert_eq!(phrase.notes.len(), stressed);
        assert_eq!(phrase.lyric_line, result.analysis.lines[i]);
    }
    let total: usize = result.melody.phrases.iter().map(|p| p.notes.len()).sum();
    assert_eq!(result.melody.note_count, total);
}

#[test]
fn empty_lyrics_are_rejected() {
    let err = service()
        .generate(&GenerationRequest::new("", "pop", "happy", 120))
        .unwrap_err();
    assert!(matches!(err, GenerationError::Validation(_)));
    assert!(err.to_string().starts_with("lyrics too short"));

    let err = service()
        .generate(&GenerationRequest::new("  la\n la  \n", "pop", "happy", 120))
        .unwrap_err();
    assert!(matches!(err, GenerationError::Validation(_)));
}

#[test]
fn tempo_500_is_clamped_to_200() {
    let result = service().generate(&shine(500)).unwrap();
    assert_eq!(
        result.warnings,
        vec![GenerationWarning::TempoClamped {
            requested: 500,
            clamped: 200
        }]
    );
    // The mood modifier is applied after clamping and clamped again.
    assert_eq!(result.melody.metadata.tempo, 200);
    assert_eq!(result.melody.phrases.len(), 2);
}

#[test]
fn unsupported_mood_falls_back() {
    let request = GenerationRequest::new(SHINE, "pop", "confused", 120).with_seed(5);
    let result = service().generate(&request).unwrap();
    assert_eq!(
        result.warnings,
        vec![GenerationWarning::UnknownMood {
            requested: "confused".into(),
            fallback: "happy".into()
        }]
    );
    assert_eq!(result.melody.phrases.len(), 2);
}

#[test]
fn unparsable_key_falls_back() {
    let request = shine(120).with_key("H# lydian-ish");
    let result = service().generate(&request).unwrap();
    assert_eq!(
        result.warnings,
        vec![GenerationWarning::UnparsableKey {
            requested: "H# lydian-ish".into()
        }]
    );
}

#[test]
fn explicit_key_is_used() {
    let result = service().generate(&shine(120).with_key("A minor")).unwrap();
    assert_eq!(result.melody.metadata.key, "A minor");
    assert_eq!(result.scale.root_pc, 9);
    assert!(result.warnings.is_empty());
}

#[test]
fn missing_voice_profile() {
    let err = service()
        .generate(&shine(120).with_voice("soprano-missing"))
        .unwrap_err();
    match err {
        GenerationError::VoiceProfileNotFound(VoiceStoreError::NotFound { id }) => {
            assert_eq!(id, "soprano-missing")
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn renderer_failure_is_propagated() {
    let err = service()
        .generate_and_render(&shine(120), &FailingRenderer)
        .unwrap_err();
    match err {
        GenerationError::Synthesis(RenderError::Failed(reason)) => {
            assert_eq!(reason, "disk quota exceeded")
        }
        other => panic!("unexpected error: {other}"),
    }
}

// ---------------------------------------------------------------------------
// Plan invariants
// ---------------------------------------------------------------------------

#[test]
fn plan_timing_invariants() {
    let result = service().generate(&shine(120)).unwrap();
    let plan = &result.plan;
    assert_eq!(plan.aligned_phonemes_per_line.len(), result.analysis.lines.len());

    let mut contours = plan.f0_track.contours.iter();
    for line in &plan.aligned_phonemes_per_line {
        let total: f64 = line.phonemes.iter().map(|p| p.duration()).sum();
        assert!((total - (line.end_time - line.start_time)).abs() < 1e-6);
        for phoneme in &line.phonemes {
            let contour = contours.next().unwrap();
            let expected = (phoneme.duration() * 100.0).ceil() as usize;
            assert_eq!(contour.len(), expected);
        }
    }
    assert!(contours.next().is_none());
    assert_eq!(
        plan.spectral_features.len(),
        plan.f0_track.contours.len()
    );
}

#[test]
fn arc_and_counts_have_one_entry_per_line() {
    let lyrics = "Hold me close\n\n   \nNever let me go\nDancing in the rain tonight";
    let request = GenerationRequest::new(lyrics, "ballad", "romantic", 72).with_seed(3);
    let result = service().generate(&request).unwrap();
    let analysis = &result.analysis;
    assert_eq!(analysis.lines.len(), 3);
    assert_eq!(analysis.emotional_arc.len(), 3);
    assert_eq!(analysis.syllable_counts.len(), 3);
    assert_eq!(analysis.stress_patterns.len(), 3);
    assert_eq!(result.melody.phrases.len(), 3);
}

#[test]
fn expressive_request_fields_reach_the_plan() {
    let mut request = shine(120).with_duration(42.0);
    request.dynamics = Some("fortissimo".into());
    request.harmony = vec![HarmonyInterval::Third, HarmonyInterval::Fifth];
    let plan = service().generate(&request).unwrap().plan;
    assert_eq!(plan.mix_parameters.compression.ratio, 6.0);
    assert_eq!(plan.mix_parameters.final_mix.output_duration, 42.0);
    assert_eq!(plan.expressive_modulation.harmony.len(), 2);
    assert!(
        plan.expressive_modulation
            .harmony
            .iter()
            .all(|v| (v.amplitude - 0.15).abs() < 1e-12)
    );
}

#[test]
fn json_renderer_writes_plan() {
    let dir = tempfile::tempdir().unwrap();
    let renderer = JsonPlanRenderer::new(dir.path());
    let rendered = service().generate_and_render(&shine(120), &renderer).unwrap();

    assert!(rendered.uri.starts_with("file://"));
    let path = renderer.path_for(&rendered.result.name());
    let json = std::fs::read_to_string(path).unwrap();
    let plan: VocalSynthesisPlan = serde_json::from_str(&json).unwrap();
    let expected = &rendered.result.plan;
    assert_eq!(plan.segments.len(), expected.segments.len());
    assert_eq!(plan.f0_track.contours.len(), expected.f0_track.contours.len());
    let symbols = |p: &VocalSynthesisPlan| -> Vec<String> {
        p.segments.iter().map(|s| s.symbol.clone()).collect()
    };
    assert_eq!(symbols(&plan), symbols(expected));
}

#[test]
fn batch_matches_individual_runs() {
    let service = service();
    let requests: Vec<_> = ["pop", "rock", "jazz", "folk"]
        .iter()
        .map(|genre| GenerationRequest::new(SHINE, genre, "calm", 100))
        .collect();
    let results = service.generate_batch(&requests, 1000);
    for (i, result) in results.into_iter().enumerate() {
        let result = result.unwrap();
        assert_eq!(result.seed, 1000 + i as u64);
        let single = service
            .generate(&requests[i].clone().with_seed(1000 + i as u64))
            .unwrap();
        assert_eq!(result, single);
    }
}

#[test]
fn config_bounds_apply() {
    let config = EngineConfig::from_toml_str("tempo_min = 60\ntempo_max = 90").unwrap();
    let store = InMemoryVoiceStore::with_default(&EngineResources::embedded().voice);
    let service = VocalGenerationService::from_config(config, store).unwrap();
    let result = service.generate(&shine(120)).unwrap();
    assert_eq!(
        result.warnings,
        vec![GenerationWarning::TempoClamped {
            requested: 120,
            clamped: 90
        }]
    );
    assert!(result.melody.metadata.tempo <= 90);
}
