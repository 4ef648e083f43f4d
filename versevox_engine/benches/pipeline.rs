// Pipeline benchmarks.
//
// Run with: cargo bench --bench pipeline

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use std::time::Duration;
use versevox_engine::{
    EngineConfig, EngineResources, GenerationRequest, InMemoryVoiceStore, VocalGenerationService,
};
use versevox_lang::{AnalyzerSettings, analyze_lyrics};

const VERSE: &str = "Shine on shining stars tonight\n\
                     Shine on shining stars so bright\n\
                     Hold me close and never let me go\n\
                     Dancing slowly in the evening glow";

fn service() -> VocalGenerationService<InMemoryVoiceStore> {
    let resources = EngineResources::embedded();
    let store = InMemoryVoiceStore::with_default(&resources.voice);
    VocalGenerationService::new(EngineConfig::default(), resources, store)
}

fn bench_analysis(c: &mut Criterion) {
    let resources = EngineResources::embedded();
    let settings = AnalyzerSettings::default();
    c.bench_function("analyze_lyrics", |b| {
        b.iter(|| black_box(analyze_lyrics(VERSE, &resources.lexicon, &settings)))
    });
}

fn bench_generate(c: &mut Criterion) {
    let service = service();
    let mut group = c.benchmark_group("generate");
    group.sample_size(20);
    group.measurement_time(Duration::from_secs(5));

    // Plan size grows with verse count (phonemes × spectral bins).
    for verses in [1usize, 2, 4] {
        let lyrics = vec![VERSE; verses].join("\n");
        let request = GenerationRequest::new(&lyrics, "pop", "happy", 120).with_seed(7);
        group.bench_with_input(BenchmarkId::from_parameter(verses), &request, |b, request| {
            b.iter(|| black_box(service.generate(request)))
        });
    }
    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let service = service();
    let requests: Vec<_> = ["pop", "rock", "jazz", "folk", "ballad", "metal", "country", "r&b"]
        .iter()
        .map(|genre| GenerationRequest::new(VERSE, genre, "calm", 100))
        .collect();
    let mut group = c.benchmark_group("batch");
    group.sample_size(10);
    group.bench_function("eight_requests", |b| {
        b.iter(|| black_box(service.generate_batch(&requests, 1)))
    });
    group.finish();
}

criterion_group!(benches, bench_analysis, bench_generate, bench_batch);
criterion_main!(benches);
