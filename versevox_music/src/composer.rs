// Melody composer: analyzed lyrics → timed note phrases.
//
// One phrase per lyric line, one note per syllable (stress-pattern entry).
// Pitch follows a running cursor:
// - The first note of a phrase sits an octave above the root, offset by
//   stress and line emotion (stressed syllables lift, unstressed sag).
// - Every later note walks one or two semitones from the previous pitch,
//   upward for positive lines, downward for negative ones, and in a random
//   direction for neutral ones. The walk reflects off the edges of a two-
//   octave band starting at the root.
// - Every candidate is quantized onto the active scale.
//
// Durations scale with tempo, stress, emotion and the genre multiplier; the
// first three notes of a phrase are capped so lines start briskly.
// Velocities come from stress plus emotion.
//
// Phrase start times are a left-to-right fold over the previous phrases'
// summed durations, so this stays a sequential loop.

use crate::scale::ScaleInstance;
use crate::tables::GenreProfile;
use serde::{Deserialize, Serialize};
use versevox_lang::LyricsAnalysis;
use versevox_prng::VoxRng;

pub const MIN_NOTE_SECONDS: f64 = 0.1;
pub const MAX_NOTE_SECONDS: f64 = 2.0;
pub const MIN_VELOCITY: u8 = 40;
pub const MAX_VELOCITY: u8 = 127;

/// Width of the pitch band above the root, in semitones.
const BAND_SEMITONES: i32 = 24;
/// Notes at the head of a phrase whose length is capped.
const CAPPED_LEAD_NOTES: usize = 3;
/// Cap for those notes, in beats.
const LEAD_NOTE_MAX_BEATS: f64 = 1.2;
/// Emotion magnitude under which the walk direction is random.
const NEUTRAL_EMOTION: f64 = 0.1;

/// Structural role of a phrase within the song.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionType {
    Intro,
    Verse,
    Chorus,
    Bridge,
    Outro,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MelodyNote {
    /// MIDI pitch.
    pub pitch: u8,
    /// Seconds, within [0.1, 2.0].
    pub duration: f64,
    pub velocity: u8,
    /// Text of the syllable sung on this note.
    pub syllable: String,
    /// Absolute onset in seconds.
    pub timestamp: f64,
}

impl MelodyNote {
    pub fn end_time(&self) -> f64 {
        self.timestamp + self.duration
    }

    /// Equal-tempered frequency of the pitch (A4 = 440 Hz).
    pub fn frequency(&self) -> f64 {
        midi_to_hz(self.pitch)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MelodyPhrase {
    pub notes: Vec<MelodyNote>,
    pub start_time: f64,
    pub lyric_line: String,
    pub emotion_weight: f64,
    pub section_type: SectionType,
}

impl MelodyPhrase {
    pub fn duration(&self) -> f64 {
        self.notes.iter().map(|n| n.duration).sum()
    }

    pub fn end_time(&self) -> f64 {
        self.start_time + self.duration()
    }
}

pub fn midi_to_hz(pitch: u8) -> f64 {
    440.0 * 2f64.powf((pitch as f64 - 69.0) / 12.0)
}

/// Compose one phrase per analyzed line.
///
/// `tempo` is the effective tempo in BPM (already mood-adjusted and clamped).
pub fn compose_phrases(
    analysis: &LyricsAnalysis,
    scale: &ScaleInstance,
    tempo: u32,
    genre: &GenreProfile,
    rng: &mut VoxRng,
) -> Vec<MelodyPhrase> {
    let beat = 60.0 / tempo.max(1) as f64;
    let line_count = analysis.lines.len();
    let mut phrases = Vec::with_capacity(line_count);
    let mut start_time = 0.0;

    for (i, line) in analysis.lines.iter().enumerate() {
        let emotion = analysis.emotional_arc.get(i).copied().unwrap_or(0.0);
        let words = analysis.words.get(i).map(Vec::as_slice).unwrap_or(&[]);

        let mut notes = Vec::new();
        let mut cursor: Option<i32> = None;
        let mut timestamp = start_time;

        for word in words {
            for (s, &stressed) in word.stress.iter().enumerate() {
                let pitch = next_pitch(scale, cursor, stressed, emotion, rng);
                cursor = Some(pitch as i32);

                let duration = note_duration(beat, stressed, emotion, genre, notes.len());
                let syllable = word
                    .syllables
                    .get(s)
                    .cloned()
                    .unwrap_or_else(|| word.text.clone());
                notes.push(MelodyNote {
                    pitch,
                    duration,
                    velocity: note_velocity(stressed, emotion),
                    syllable,
                    timestamp,
                });
                timestamp += duration;
            }
        }

        let phrase = MelodyPhrase {
            notes,
            start_time,
            lyric_line: line.clone(),
            emotion_weight: emotion,
            section_type: section_for(i, line_count),
        };
        start_time = phrase.end_time();
        phrases.push(phrase);
    }

    phrases
}

fn next_pitch(
    scale: &ScaleInstance,
    cursor: Option<i32>,
    stressed: bool,
    emotion: f64,
    rng: &mut VoxRng,
) -> u8 {
    let low = scale.root_midi as i32;
    let high = low + BAND_SEMITONES;

    let candidate = match cursor {
        None => low + 12 + first_note_offset(stressed, emotion),
        Some(previous) => {
            let direction = if emotion > NEUTRAL_EMOTION {
                1
            } else if emotion < -NEUTRAL_EMOTION {
                -1
            } else {
                rng.sign()
            };
            let step = rng.range_i32_inclusive(1, 2);
            reflect(previous + direction * step, low, high)
        }
    };

    scale.quantize(candidate.clamp(low, high))
}

/// Offset from the phrase's starting pitch for its first syllable.
pub fn first_note_offset(stressed: bool, emotion: f64) -> i32 {
    if stressed {
        2 + (emotion * 3.0).floor() as i32
    } else {
        -1 - emotion.abs().floor() as i32
    }
}

fn reflect(pitch: i32, low: i32, high: i32) -> i32 {
    if pitch > high {
        high - (pitch - high)
    } else if pitch < low {
        low + (low - pitch)
    } else {
        pitch
    }
}

/// Note length in seconds.
pub fn note_duration(
    beat: f64,
    stressed: bool,
    emotion: f64,
    genre: &GenreProfile,
    index_in_phrase: usize,
) -> f64 {
    let mut duration = beat * if stressed { 1.5 } else { 1.0 };
    duration *= 1.0 + 0.2 * emotion.abs();
    duration *= genre.duration_multiplier;
    if index_in_phrase < CAPPED_LEAD_NOTES {
        duration = duration.min(LEAD_NOTE_MAX_BEATS * beat);
    }
    duration.clamp(MIN_NOTE_SECONDS, MAX_NOTE_SECONDS)
}

pub fn note_velocity(stressed: bool, emotion: f64) -> u8 {
    let base: i64 = if stressed { 90 } else { 70 };
    let velocity = base + (20.0 * emotion.abs()).round() as i64;
    velocity.clamp(MIN_VELOCITY as i64, MAX_VELOCITY as i64) as u8
}

/// Section role by line position.
pub fn section_for(index: usize, line_count: usize) -> SectionType {
    if index == 0 {
        return SectionType::Intro;
    }
    if index + 1 == line_count {
        return SectionType::Outro;
    }
    match (index - 1) % 3 {
        0 => SectionType::Verse,
        1 => SectionType::Chorus,
        _ => SectionType::Bridge,
    }
}
