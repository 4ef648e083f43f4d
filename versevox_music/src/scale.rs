// Scale support for lyric-driven melody generation.
//
// A `Scale` is a named list of semitone intervals from the root, loaded from
// the music tables (major, minor, the church modes, pentatonics, blues). A
// `ScaleInstance` pins a scale to a root pitch class and anchors it at
// MIDI octave 3 (root_midi = 48 + pc), which is where the composer's pitch
// band starts.
//
// This module provides:
// - Scale membership tests by pitch class
// - Degree snapping: nearest interval of the scale (or the octave), ties down
// - Quantizing an absolute pitch onto the scale while keeping its octave band
// - Key-name formatting and parsing ("C", "F#", "Bb minor", "A dorian")
//
// Used by key.rs for selection and composer.rs for every note.

use crate::tables::MusicTableError;
use serde::{Deserialize, Serialize};

/// MIDI pitch of pitch class 0 in the composer's base octave (C3).
pub const BASE_OCTAVE_MIDI: u8 = 48;

const PITCH_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// A scale pattern: ascending semitone offsets from the root, starting at 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scale {
    pub name: String,
    pub intervals: Vec<u8>,
}

impl Scale {
    pub fn new(name: &str, intervals: Vec<u8>) -> Result<Self, MusicTableError> {
        let invalid = |reason: &str| MusicTableError::InvalidScale {
            name: name.to_string(),
            reason: reason.to_string(),
        };
        if intervals.first() != Some(&0) {
            return Err(invalid("must start at interval 0"));
        }
        if intervals.iter().any(|&iv| iv > 11) {
            return Err(invalid("intervals must lie within one octave (0-11)"));
        }
        if intervals.windows(2).any(|w| w[0] >= w[1]) {
            return Err(invalid("intervals must be strictly ascending"));
        }
        Ok(Scale {
            name: name.to_string(),
            intervals,
        })
    }

    /// The 12 pitch classes in the scale, indexed relative to the root.
    pub fn pitch_classes(&self) -> [bool; 12] {
        let mut pcs = [false; 12];
        for &interval in &self.intervals {
            pcs[interval as usize] = true;
        }
        pcs
    }

    /// Nearest scale interval to `degree` (0-11), treating the octave (12)
    /// as a candidate too. Equidistant candidates resolve downward.
    pub fn snap_degree(&self, degree: u8) -> u8 {
        let degree = degree % 12;
        let mut best = 0u8;
        let mut best_dist = u8::MAX;
        for candidate in self.intervals.iter().copied().chain(std::iter::once(12)) {
            let dist = candidate.abs_diff(degree);
            // Candidates ascend, so strict `<` keeps the lower one on ties.
            if dist < best_dist {
                best = candidate;
                best_dist = dist;
            }
        }
        best
    }
}

/// A scale pinned to a root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScaleInstance {
    pub scale: Scale,
    /// Pitch class of the root (0 = C, 2 = D, ...).
    pub root_pc: u8,
    /// MIDI pitch of the root in the base octave.
    pub root_midi: u8,
}

impl ScaleInstance {
    pub fn new(scale: Scale, root_pc: u8) -> Self {
        let root_pc = root_pc % 12;
        ScaleInstance {
            scale,
            root_pc,
            root_midi: BASE_OCTAVE_MIDI + root_pc,
        }
    }

    /// Check if a MIDI pitch is in this scale.
    pub fn is_in_scale(&self, pitch: u8) -> bool {
        let pc = (pitch % 12 + 12 - self.root_pc) % 12;
        self.scale.pitch_classes()[pc as usize]
    }

    /// Snap an absolute pitch onto the scale.
    ///
    /// The degree relative to the root is snapped with `Scale::snap_degree`
    /// and the pitch is rebuilt in the same octave band (counted from
    /// `root_midi`), so snapping to the octave moves up into the next band.
    pub fn quantize(&self, pitch: i32) -> u8 {
        let relative = pitch - self.root_midi as i32;
        let degree = relative.rem_euclid(12) as u8;
        let octave = relative.div_euclid(12);
        let snapped = self.root_midi as i32 + octave * 12 + self.scale.snap_degree(degree) as i32;
        snapped.clamp(0, 127) as u8
    }

    /// Human-readable key name, e.g. "G major".
    pub fn key_name(&self) -> String {
        format!("{} {}", pitch_name(self.root_pc), self.scale.name)
    }

    /// Get all in-scale pitches in a range.
    pub fn pitches_in_range(&self, low: u8, high: u8) -> Vec<u8> {
        (low..=high).filter(|&p| self.is_in_scale(p)).collect()
    }
}

/// Sharp-spelled name of a pitch class.
pub fn pitch_name(pc: u8) -> &'static str {
    PITCH_NAMES[(pc % 12) as usize]
}

/// A key requested by name: root pitch class plus an optional scale name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpec {
    pub root_pc: u8,
    /// Lowercase scale name with spaces joined by `_` ("harmonic_minor").
    pub scale: Option<String>,
}

/// Parse a key string such as "C", "F#", "Bb minor" or "A harmonic minor".
///
/// The letter is case-insensitive; accidentals are `#`/`♯` and `b`/`♭`.
/// Returns `None` when the root cannot be read. Whether the scale name
/// exists is the caller's concern.
pub fn parse_key(text: &str) -> Option<KeySpec> {
    let mut tokens = text.split_whitespace();
    let root = tokens.next()?;

    let mut chars = root.chars();
    let letter = chars.next()?.to_ascii_uppercase();
    let natural: i32 = match letter {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return None,
    };
    let accidental: i32 = match chars.as_str() {
        "" => 0,
        "#" | "♯" => 1,
        "b" | "♭" => -1,
        _ => return None,
    };
    let root_pc = (natural + accidental).rem_euclid(12) as u8;

    let rest: Vec<String> = tokens.map(str::to_lowercase).collect();
    let scale = if rest.is_empty() {
        None
    } else {
        Some(rest.join("_"))
    };

    Some(KeySpec { root_pc, scale })
}
