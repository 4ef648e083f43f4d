// Summary audio features for a generated melody.

use crate::tables::{GenreProfile, MoodProfile};
use serde::{Deserialize, Serialize};

pub const TIME_SIGNATURE: &str = "4/4";

/// Tempo at which genre danceability applies in full.
const DANCE_TEMPO: f64 = 120.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioFeatures {
    pub tempo: u32,
    pub key: String,
    pub time_signature: String,
    pub energy: f64,
    /// Average emotion remapped from [-1, 1] to [0, 1].
    pub valence: f64,
    pub danceability: f64,
    pub acousticness: f64,
}

pub fn estimate_features(
    emotional_arc: &[f64],
    tempo: u32,
    key: &str,
    mood: &MoodProfile,
    genre: &GenreProfile,
) -> AudioFeatures {
    let average = if emotional_arc.is_empty() {
        0.0
    } else {
        emotional_arc.iter().sum::<f64>() / emotional_arc.len() as f64
    };
    let tempo_fit = 1.0 - (tempo as f64 - DANCE_TEMPO).abs() / 200.0;

    AudioFeatures {
        tempo,
        key: key.to_string(),
        time_signature: TIME_SIGNATURE.to_string(),
        energy: ((mood.energy + genre.energy) / 2.0).clamp(0.0, 1.0),
        valence: ((average + 1.0) / 2.0).clamp(0.0, 1.0),
        danceability: (genre.danceability * tempo_fit).clamp(0.0, 1.0),
        acousticness: genre.acousticness.clamp(0.0, 1.0),
    }
}
