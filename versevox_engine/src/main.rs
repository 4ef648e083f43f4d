// `versevox` command line.
//
//   versevox generate lyrics.txt --genre pop --mood happy --tempo 120
//   versevox batch requests.json --base-seed 7
//
// Each generation writes `<generation id>.mid` and `<generation id>.plan.json`
// into the output directory. Set LOG_LEVEL (e.g. `debug`,
// `versevox_music=trace`) to change logging.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{error, info, level_filters::LevelFilter, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use versevox_engine::{
    EngineConfig, GenerationRequest, GenerationResult, InMemoryVoiceStore, JsonPlanRenderer,
    VocalGenerationService,
};
use versevox_music::midi::write_midi;
use versevox_voice::HarmonyInterval;

#[derive(Parser, Debug)]
#[clap(name = "versevox", version, about = "Turn lyrics into a melody and a vocal synthesis plan")]
struct CliArgs {
    /// Engine config (TOML). Defaults apply when omitted.
    #[clap(long, global = true)]
    config: Option<PathBuf>,

    /// Extra voice profiles (JSON), one per flag.
    #[clap(long = "voice-profile", global = true)]
    voice_profiles: Vec<PathBuf>,

    /// Where `.mid` and `.plan.json` files go.
    #[clap(long, global = true, default_value = "out")]
    output_dir: PathBuf,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate one song from a lyrics file.
    Generate(GenerateArgs),
    /// Generate every request in a JSON array file, in parallel.
    Batch(BatchArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Lyrics text file, one lyric line per line.
    lyrics: PathBuf,

    #[clap(long, default_value = "pop")]
    genre: String,

    #[clap(long, default_value = "happy")]
    mood: String,

    #[clap(long, default_value_t = 120)]
    tempo: u32,

    /// e.g. "A minor", "F#", "Bb dorian".
    #[clap(long)]
    key: Option<String>,

    /// Target output length in seconds.
    #[clap(long)]
    duration: Option<f64>,

    #[clap(long)]
    language: Option<String>,

    /// Voice profile id; "default" is always available.
    #[clap(long, default_value = "default")]
    voice: String,

    /// Dynamic marking: pp, p, mp, mf, f, ff.
    #[clap(long)]
    dynamics: Option<String>,

    /// Harmony intervals, comma separated (third, fifth, minor_seventh, octave).
    #[clap(long, value_delimiter = ',')]
    harmony: Vec<HarmonyInterval>,

    #[clap(long)]
    seed: Option<u64>,
}

#[derive(Args, Debug)]
struct BatchArgs {
    /// JSON array of generation requests.
    requests: PathBuf,

    #[clap(long, default_value_t = 0)]
    base_seed: u64,
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()?;

    let config = match &cli_args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("Failed to load config file: {:?}", path))?,
        None => EngineConfig::default(),
    };
    let service = build_service(config, &cli_args.voice_profiles)?;
    let renderer = JsonPlanRenderer::new(&cli_args.output_dir);

    match cli_args.command {
        Command::Generate(args) => {
            let lyrics = std::fs::read_to_string(&args.lyrics)
                .with_context(|| format!("Failed to read lyrics: {:?}", args.lyrics))?;
            let request = GenerationRequest {
                lyrics,
                genre: args.genre,
                mood: args.mood,
                tempo: args.tempo,
                key: args.key,
                duration: args.duration,
                voice_profile_ref: args.voice,
                language: args.language,
                dynamics: args.dynamics,
                harmony: args.harmony,
                seed: args.seed,
            };
            let result = service.generate(&request)?;
            write_outputs(&service, &renderer, &result, &cli_args.output_dir)?;
        }
        Command::Batch(args) => {
            let json = std::fs::read_to_string(&args.requests)
                .with_context(|| format!("Failed to read requests: {:?}", args.requests))?;
            let requests: Vec<GenerationRequest> = serde_json::from_str(&json)
                .with_context(|| format!("Failed to parse requests: {:?}", args.requests))?;
            let results = service.generate_batch(&requests, args.base_seed);
            let mut failed = 0;
            for (i, result) in results.iter().enumerate() {
                match result {
                    Ok(result) => write_outputs(&service, &renderer, result, &cli_args.output_dir)?,
                    Err(err) => {
                        failed += 1;
                        error!(index = i, "generation failed: {err}");
                    }
                }
            }
            info!(total = results.len(), failed, "batch finished");
        }
    }
    Ok(())
}

fn build_service(
    config: EngineConfig,
    profile_paths: &[PathBuf],
) -> Result<VocalGenerationService<InMemoryVoiceStore>> {
    let resources = versevox_engine::EngineResources::load(&config)?;
    let mut store = InMemoryVoiceStore::with_default(&resources.voice);
    for path in profile_paths {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read voice profile: {:?}", path))?;
        let id = store
            .insert_json(&json)
            .with_context(|| format!("Invalid voice profile: {:?}", path))?;
        info!(id = %id, "voice profile loaded");
    }
    Ok(VocalGenerationService::new(config, resources, store))
}

fn write_outputs(
    service: &VocalGenerationService<InMemoryVoiceStore>,
    renderer: &JsonPlanRenderer,
    result: &GenerationResult,
    output_dir: &Path,
) -> Result<()> {
    for warning in &result.warnings {
        warn!("{warning}");
    }
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output dir: {:?}", output_dir))?;
    let midi_path = output_dir.join(format!("{}.mid", result.name()));
    write_midi(&result.melody, &midi_path)
        .with_context(|| format!("Failed to write MIDI: {:?}", midi_path))?;
    let uri = service.render(result, renderer)?;
    info!(
        key = %result.melody.metadata.key,
        tempo = result.melody.metadata.tempo,
        notes = result.melody.note_count,
        midi = %midi_path.display(),
        plan = %uri,
        "song written"
    );
    Ok(())
}
