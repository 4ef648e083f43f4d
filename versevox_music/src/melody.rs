// Top-level melody generation: analysis + tables + request knobs →
// `GeneratedMelody`.
//
// Order of operations:
// 1. Resolve the genre (unknown → default genre, reported as a fallback).
// 2. Select the key (key.rs), which also resolves the mood.
// 3. Effective tempo = request tempo × mood tempo modifier, clamped.
// 4. Compose phrases (composer.rs).
// 5. Estimate audio features, then stamp metadata: a generation id drawn
//    from the same `VoxRng` and a SHA-256 over the canonical phrase JSON.
//
// The RNG is consumed in a fixed order (root, walk, id), so one seed always
// reproduces the same melody and id.

use crate::composer::{MelodyPhrase, compose_phrases};
use crate::features::{AudioFeatures, estimate_features};
use crate::key::select_key;
use crate::scale::ScaleInstance;
use crate::tables::{GenreProfile, Inflection, MoodProfile, MusicTables};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;
use versevox_lang::LyricsAnalysis;
use versevox_prng::VoxRng;

/// A request value the music layer could not honor as given, and what it
/// used instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Fallback {
    UnknownMood { requested: String, fallback: String },
    UnknownGenre { requested: String, fallback: String },
    UnparsableKey { requested: String },
}

#[derive(Debug, Error)]
pub enum MelodyError {
    #[error("failed to serialize phrases for hashing: {0}")]
    Hash(#[from] serde_json::Error),
}

/// Knobs for one melody generation.
#[derive(Debug, Clone)]
pub struct MelodyParams<'a> {
    pub mood: &'a str,
    pub genre: &'a str,
    /// Requested tempo in BPM, already clamped by the caller.
    pub tempo: u32,
    /// Inclusive bounds for the mood-adjusted tempo.
    pub tempo_range: (u32, u32),
    pub key: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MelodyMetadata {
    pub key: String,
    pub tempo: u32,
    pub generation_id: Uuid,
    pub content_hash: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedMelody {
    pub phrases: Vec<MelodyPhrase>,
    pub audio_features: AudioFeatures,
    pub total_duration: f64,
    pub note_count: usize,
    pub metadata: MelodyMetadata,
}

/// A melody plus the resolved settings later stages need.
#[derive(Debug, Clone)]
pub struct ComposedMelody {
    pub melody: GeneratedMelody,
    pub scale: ScaleInstance,
    pub mood: MoodProfile,
    pub genre: GenreProfile,
    pub fallbacks: Vec<Fallback>,
}

impl ComposedMelody {
    pub fn inflection(&self) -> Inflection {
        self.mood.inflection
    }
}

pub fn generate_melody(
    analysis: &LyricsAnalysis,
    tables: &MusicTables,
    params: &MelodyParams<'_>,
    rng: &mut VoxRng,
) -> Result<ComposedMelody, MelodyError> {
    let mut fallbacks = Vec::new();

    let genre = match tables.genre(params.genre) {
        Some(genre) => genre.clone(),
        None => {
            let (name, genre) = tables.default_genre();
            warn!(requested = params.genre, fallback = name, "unknown genre, using default");
            fallbacks.push(Fallback::UnknownGenre {
                requested: params.genre.to_string(),
                fallback: name.to_string(),
            });
            genre.clone()
        }
    };

    let selection = select_key(tables, &analysis.emotional_arc, params.mood, params.key, rng);
    fallbacks.extend(selection.fallbacks.iter().cloned());

    let tempo = effective_tempo(params.tempo, selection.mood.tempo_modifier, params.tempo_range);
    let phrases = compose_phrases(analysis, &selection.scale, tempo, &genre, rng);

    let key = selection.scale.key_name();
    let audio_features =
        estimate_features(&analysis.emotional_arc, tempo, &key, &selection.mood, &genre);
    let total_duration = phrases.last().map_or(0.0, MelodyPhrase::end_time);
    let note_count = phrases.iter().map(|p| p.notes.len()).sum();
    let generation_id = uuid::Builder::from_random_bytes(rng.next_128_bits()).into_uuid();
    let content_hash = content_hash(&phrases)?;

    info!(
        %generation_id,
        key = %key,
        tempo,
        phrases = phrases.len(),
        note_count,
        total_duration,
        "melody generated"
    );

    Ok(ComposedMelody {
        melody: GeneratedMelody {
            phrases,
            audio_features,
            total_duration,
            note_count,
            metadata: MelodyMetadata {
                key,
                tempo,
                generation_id,
                content_hash,
            },
        },
        scale: selection.scale,
        mood: selection.mood,
        genre,
        fallbacks,
    })
}

/// Mood-adjusted tempo, rounded and clamped to `range`.
pub fn effective_tempo(tempo: u32, modifier: f64, range: (u32, u32)) -> u32 {
    let (low, high) = range;
    let scaled = (tempo as f64 * modifier).round();
    (scaled.max(0.0) as u32).clamp(low, high.max(low))
}

/// SHA-256 hex digest of the phrases' canonical JSON.
pub fn content_hash(phrases: &[MelodyPhrase]) -> Result<String, serde_json::Error> {
    let json = serde_json::to_vec(phrases)?;
    let digest = Sha256::digest(&json);
    Ok(hex_string(&digest))
}

fn hex_string(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push_str(&format!("{:02x}", b));
    }
    out
}
