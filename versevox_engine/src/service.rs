// The generation service: one request in, one melody plus synthesis plan
// out.
//
// Request flow:
// 1. Clamp tempo and duration to the configured bounds (warnings).
// 2. Resolve the language against the phoneme inventory (warning).
// 3. Analyze the lyrics; too-short input is the only validation error.
// 4. Fetch the voice profile from the injected store.
// 5. Compose the melody (mood/genre/key fallbacks become warnings).
// 6. Build the vocal synthesis plan and the melodic contour.
//
// The service holds only read-only data, so one instance can serve any
// number of threads. `generate_batch` runs requests in parallel with rayon;
// each request is still a sequential fold with its own `VoxRng`.

use crate::config::{ConfigError, EngineConfig};
use crate::error::{GenerationError, GenerationWarning};
use crate::ports::{AudioRenderer, VoiceProfileStore};
use crate::request::GenerationRequest;
use crate::resources::EngineResources;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;
use versevox_lang::{AnalyzerSettings, LyricsAnalysis, analyze_lyrics};
use versevox_music::{
    ContourAnalysis, GeneratedMelody, MelodyParams, ScaleInstance, analyze_contour,
    generate_melody,
};
use versevox_prng::VoxRng;
use versevox_voice::{SpectralSettings, VocalSynthesisPlan, VoiceSettings, synthesize_plan};

/// Everything one request produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResult {
    pub seed: u64,
    pub analysis: LyricsAnalysis,
    pub scale: ScaleInstance,
    pub melody: GeneratedMelody,
    pub contour: ContourAnalysis,
    pub plan: VocalSynthesisPlan,
    pub warnings: Vec<GenerationWarning>,
}

impl GenerationResult {
    /// File stem for artifacts of this result.
    pub fn name(&self) -> String {
        self.melody.metadata.generation_id.to_string()
    }
}

/// A result whose plan has been handed to a renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedGeneration {
    pub result: GenerationResult,
    pub uri: String,
}

pub struct VocalGenerationService<S> {
    config: EngineConfig,
    resources: EngineResources,
    store: S,
}

impl<S: VoiceProfileStore> VocalGenerationService<S> {
    pub fn new(config: EngineConfig, resources: EngineResources, store: S) -> Self {
        VocalGenerationService {
            config,
            resources,
            store,
        }
    }

    /// Validate the config and load the tables it names.
    pub fn from_config(config: EngineConfig, store: S) -> Result<Self, ConfigError> {
        config.validate()?;
        let resources = EngineResources::load(&config)?;
        Ok(Self::new(config, resources, store))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn resources(&self) -> &EngineResources {
        &self.resources
    }

    pub fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult, GenerationError> {
        let seed = request.seed.unwrap_or_else(fresh_seed);
        self.generate_seeded(request, seed)
    }

    /// Run independent requests in parallel. Requests without their own seed
    /// get `base_seed + index`. Results keep input order.
    pub fn generate_batch(
        &self,
        requests: &[GenerationRequest],
        base_seed: u64,
    ) -> Vec<Result<GenerationResult, GenerationError>> {
        info!(count = requests.len(), base_seed, "batch generation started");
        requests
            .par_iter()
            .enumerate()
            .map(|(i, request)| {
                let seed = request.seed.unwrap_or(base_seed.wrapping_add(i as u64));
                self.generate_seeded(request, seed)
            })
            .collect()
    }

    /// Hand a finished plan to the renderer. Renderer failures come back as
    /// `GenerationError::Synthesis` with the renderer's error inside.
    pub fn render(
        &self,
        result: &GenerationResult,
        renderer: &dyn AudioRenderer,
    ) -> Result<String, GenerationError> {
        let uri = renderer.render(&result.name(), &result.plan)?;
        info!(uri = %uri, "plan rendered");
        Ok(uri)
    }

    pub fn generate_and_render(
        &self,
        request: &GenerationRequest,
        renderer: &dyn AudioRenderer,
    ) -> Result<RenderedGeneration, GenerationError> {
        let result = self.generate(request)?;
        let uri = self.render(&result, renderer)?;
        Ok(RenderedGeneration { result, uri })
    }

    fn generate_seeded(
        &self,
        request: &GenerationRequest,
        seed: u64,
    ) -> Result<GenerationResult, GenerationError> {
        let config = &self.config;
        let resources = &self.resources;
        let mut warnings = Vec::new();
        debug!(seed, genre = %request.genre, mood = %request.mood, "generation started");

        let tempo = config.clamp_tempo(request.tempo);
        if tempo != request.tempo {
            warn!(requested = request.tempo, clamped = tempo, "tempo out of range, clamped");
            warnings.push(GenerationWarning::TempoClamped {
                requested: request.tempo,
                clamped: tempo,
            });
        }

        let target_duration = request.duration.map(|requested| {
            let clamped = config.clamp_duration(requested);
            if clamped != requested {
                warn!(requested, clamped, "duration out of range, clamped");
                warnings.push(GenerationWarning::DurationClamped { requested, clamped });
            }
            clamped
        });

        let language = self.resolve_language(request.language.as_deref(), &mut warnings);

        let analysis = analyze_lyrics(
            &request.lyrics,
            &resources.lexicon,
            &AnalyzerSettings {
                min_chars: config.min_lyric_chars,
                rhyme_suffix_len: config.rhyme_suffix_len,
            },
        )?;

        let profile = self.store.get(&request.voice_profile_ref)?;

        let mut rng = VoxRng::new(seed);
        let composed = generate_melody(
            &analysis,
            &resources.music,
            &MelodyParams {
                mood: &request.mood,
                genre: &request.genre,
                tempo,
                tempo_range: (config.tempo_min, config.tempo_max),
                key: request.key.as_deref(),
            },
            &mut rng,
        )?;
        warnings.extend(composed.fallbacks.iter().cloned().map(GenerationWarning::from));

        let genre = match resources.music.genre(&request.genre) {
            Some(_) => request.genre.clone(),
            None => resources.music.default_genre().0.to_string(),
        };
        let settings = VoiceSettings {
            language,
            genre,
            singing_style: composed.genre.singing_style.clone(),
            inflection: composed.inflection(),
            f0_sample_rate: config.f0_sample_rate,
            spectral: SpectralSettings {
                bins: config.spectral_bins,
                max_hz: config.spectral_max_hz,
            },
            dynamics: request.dynamics.clone(),
            harmony: request.harmony.clone(),
            harmony_blend: config.harmony_blend,
            target_duration,
        };
        let plan = synthesize_plan(
            &composed.melody,
            &resources.inventory,
            &resources.voice,
            &profile,
            &settings,
            &mut rng,
        );
        let contour = analyze_contour(&composed.melody.phrases);

        info!(
            seed,
            generation_id = %composed.melody.metadata.generation_id,
            warnings = warnings.len(),
            "generation finished"
        );

        Ok(GenerationResult {
            seed,
            analysis,
            scale: composed.scale,
            melody: composed.melody,
            contour,
            plan,
            warnings,
        })
    }

    fn resolve_language(
        &self,
        requested: Option<&str>,
        warnings: &mut Vec<GenerationWarning>,
    ) -> String {
        let inventory = &self.resources.inventory;
        let fallback = if inventory.supports(&self.config.default_language) {
            self.config.default_language.as_str()
        } else {
            versevox_lang::phonemes::FALLBACK_LANGUAGE
        };
        match requested {
            None => fallback.to_string(),
            Some(language) if inventory.supports(language) => language.to_string(),
            Some(language) => {
                warn!(requested = language, fallback, "unsupported language, using fallback");
                warnings.push(GenerationWarning::UnknownLanguage {
                    requested: language.to_string(),
                    fallback: fallback.to_string(),
                });
                fallback.to_string()
            }
        }
    }
}

fn fresh_seed() -> u64 {
    Uuid::new_v4().as_u64_pair().0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::InMemoryVoiceStore;

    const LYRICS: &str = "Shine on shining stars tonight\nShine on shining stars so bright";

    fn service() -> VocalGenerationService<InMemoryVoiceStore> {
        let resources = EngineResources::embedded();
        let store = InMemoryVoiceStore::with_default(&resources.voice);
        VocalGenerationService::new(EngineConfig::default(), resources, store)
    }

    #[test]
    fn seeded_requests_reproduce() {
        let service = service();
        let request = GenerationRequest::new(LYRICS, "pop", "happy", 120).with_seed(77);
        let a = service.generate(&request).unwrap();
        let b = service.generate(&request).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.seed, 77);
    }

    #[test]
    fn unseeded_request_records_its_seed() {
        let service = service();
        let request = GenerationRequest::new(LYRICS, "pop", "happy", 120);
        let first = service.generate(&request).unwrap();
        let replay = service
            .generate(&request.clone().with_seed(first.seed))
            .unwrap();
        assert_eq!(first.melody, replay.melody);
    }

    #[test]
    fn duration_is_clamped_into_plan() {
        let service = service();
        let request = GenerationRequest::new(LYRICS, "pop", "happy", 120)
            .with_seed(1)
            .with_duration(3.0);
        let result = service.generate(&request).unwrap();
        assert_eq!(result.plan.mix_parameters.final_mix.output_duration, 10.0);
        assert!(result.warnings.contains(&GenerationWarning::DurationClamped {
            requested: 3.0,
            clamped: 10.0
        }));
    }

    #[test]
    fn unsupported_language_falls_back() {
        let service = service();
        let request = GenerationRequest::new(LYRICS, "pop", "happy", 120)
            .with_seed(1)
            .with_language("tlh");
        let result = service.generate(&request).unwrap();
        assert_eq!(
            result.warnings,
            vec![GenerationWarning::UnknownLanguage {
                requested: "tlh".into(),
                fallback: "en".into()
            }]
        );
    }

    #[test]
    fn spanish_is_supported() {
        let service = service();
        let request = GenerationRequest::new("Canta la luna\nbrilla la noche", "folk", "romantic", 100)
            .with_seed(3)
            .with_language("es");
        let result = service.generate(&request).unwrap();
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn unknown_genre_uses_default_timbre() {
        let service = service();
        let request = GenerationRequest::new(LYRICS, "vaporwave", "happy", 120).with_seed(2);
        let result = service.generate(&request).unwrap();
        let pop = service.resources().voice.genre_timbre("pop");
        assert_eq!(result.plan.mix_parameters.reverb.room_size, pop.reverb.room_size);
        assert!(matches!(
            result.warnings.as_slice(),
            [GenerationWarning::UnknownGenre { .. }]
        ));
    }

    #[test]
    fn batch_keeps_order_and_seeds() {
        let service = service();
        let requests = vec![
            GenerationRequest::new(LYRICS, "pop", "happy", 120),
            GenerationRequest::new("too short", "pop", "happy", 120),
            GenerationRequest::new(LYRICS, "rock", "energetic", 140).with_seed(900),
        ];
        let results = service.generate_batch(&requests, 40);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().seed, 40);
        assert!(matches!(results[1], Err(GenerationError::Validation(_))));
        assert_eq!(results[2].as_ref().unwrap().seed, 900);

        let single = service
            .generate(&requests[0].clone().with_seed(40))
            .unwrap();
        assert_eq!(results[0].as_ref().unwrap(), &single);
    }
}
