// Melody aligner: phonemes of a lyric line → time windows inside the line's
// melody phrase.
//
// Each phoneme gets a share of the phrase's duration proportional to its
// nominal duration. Start times are a running sum, and the final phoneme's
// end is pinned to the phrase end so the windows tile the phrase exactly.
//
// The notes sounding during a window (interval overlap, so a note that
// starts before the window but is still held counts) set the phoneme's
// pitch target: the note-duration-weighted mean frequency, or 220 Hz when
// nothing sounds.

use serde::{Deserialize, Serialize};
use versevox_lang::{Phoneme, PhonemeInventory};
use versevox_music::{GeneratedMelody, MelodyNote, MelodyPhrase};

/// Pitch target when no melody note overlaps a phoneme.
pub const DEFAULT_PITCH_HZ: f64 = 220.0;

/// Consonants allowed on each side of a vowel for it to count as a nucleus.
const NUCLEUS_MAX_CONSONANTS: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyllablePosition {
    Onset,
    Nucleus,
    Coda,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignedPhoneme {
    #[serde(flatten)]
    pub phoneme: Phoneme,
    pub start_time: f64,
    pub end_time: f64,
    pub melody_notes: Vec<MelodyNote>,
    /// Hz.
    pub pitch_target: f64,
    pub syllable_position: SyllablePosition,
}

impl AlignedPhoneme {
    pub fn duration(&self) -> f64 {
        self.end_time - self.start_time
    }
}

/// The aligned phonemes of one lyric line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignedLine {
    pub line_index: usize,
    pub lyric_line: String,
    pub start_time: f64,
    pub end_time: f64,
    pub phonemes: Vec<AlignedPhoneme>,
}

/// Transcribe and align every phrase of a melody.
pub fn align_melody(
    melody: &GeneratedMelody,
    inventory: &PhonemeInventory,
    language: &str,
    singing_style: &str,
) -> Vec<AlignedLine> {
    melody
        .phrases
        .iter()
        .enumerate()
        .map(|(i, phrase)| {
            let phonemes = inventory.transcribe(&phrase.lyric_line, language, singing_style);
            align_phrase(i, phonemes, phrase)
        })
        .collect()
}

/// Distribute a phrase's duration across its phonemes.
pub fn align_phrase(line_index: usize, phonemes: Vec<Phoneme>, phrase: &MelodyPhrase) -> AlignedLine {
    let line_start = phrase.start_time;
    let line_end = phrase.end_time();
    let line_duration = line_end - line_start;
    let total_weight: f64 = phonemes.iter().map(|p| p.base_duration).sum();
    let positions = syllable_positions(&phonemes);
    let count = phonemes.len();

    let mut aligned = Vec::with_capacity(count);
    let mut cursor = line_start;
    for (i, (phoneme, position)) in phonemes.into_iter().zip(positions).enumerate() {
        let share = if total_weight > 0.0 {
            phoneme.base_duration / total_weight * line_duration
        } else {
            0.0
        };
        let start_time = cursor;
        let end_time = if i + 1 == count {
            line_end
        } else {
            start_time + share
        };
        cursor = end_time;

        let melody_notes: Vec<MelodyNote> = phrase
            .notes
            .iter()
            // Any overlap with the window counts, not just notes starting in it.
            .filter(|n| n.timestamp < end_time && n.end_time() > start_time)
            .cloned()
            .collect();
        let pitch_target = weighted_pitch(&melody_notes);

        aligned.push(AlignedPhoneme {
            phoneme,
            start_time,
            end_time,
            melody_notes,
            pitch_target,
            syllable_position: position,
        });
    }

    AlignedLine {
        line_index,
        lyric_line: phrase.lyric_line.clone(),
        start_time: line_start,
        end_time: line_end,
        phonemes: aligned,
    }
}

fn weighted_pitch(notes: &[MelodyNote]) -> f64 {
    let weight: f64 = notes.iter().map(|n| n.duration).sum();
    if weight <= 0.0 {
        return DEFAULT_PITCH_HZ;
    }
    notes.iter().map(|n| n.frequency() * n.duration).sum::<f64>() / weight
}

/// Onset/nucleus/coda role of each phoneme in a line.
///
/// A vowel flanked by at most two consonants on each side is a nucleus.
/// Otherwise the first phoneme is an onset and the last a coda; remaining
/// vowels are nuclei, and consonants are onsets before a vowel and codas
/// elsewhere.
pub fn syllable_positions(phonemes: &[Phoneme]) -> Vec<SyllablePosition> {
    let n = phonemes.len();
    (0..n)
        .map(|i| {
            let p = &phonemes[i];
            if p.is_vowel() {
                let before = phonemes[..i].iter().rev().take_while(|q| !q.is_vowel()).count();
                let after = phonemes[i + 1..].iter().take_while(|q| !q.is_vowel()).count();
                if before <= NUCLEUS_MAX_CONSONANTS && after <= NUCLEUS_MAX_CONSONANTS {
                    return SyllablePosition::Nucleus;
                }
            }
            if i == 0 {
                SyllablePosition::Onset
            } else if i + 1 == n {
                SyllablePosition::Coda
            } else if p.is_vowel() {
                SyllablePosition::Nucleus
            } else if phonemes[i + 1].is_vowel() {
                SyllablePosition::Onset
            } else {
                SyllablePosition::Coda
            }
        })
        .collect()
}
