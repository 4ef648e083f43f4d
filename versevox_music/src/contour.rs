// Melodic contour analysis over a generated melody.
//
// Reads the pitch sequence across all phrases and summarizes its shape:
// successive intervals, the share of rising and falling steps, how often the
// direction flips, and an overall contour label.

use crate::composer::MelodyPhrase;
use serde::{Deserialize, Serialize};

/// Ratio by which one direction must dominate to label the contour.
const DOMINANCE: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContourType {
    Ascending,
    Descending,
    Wave,
    Static,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContourAnalysis {
    /// Signed semitone steps between consecutive notes.
    pub intervals: Vec<i32>,
    pub ascending_ratio: f64,
    pub descending_ratio: f64,
    pub direction_changes: usize,
    pub contour_type: ContourType,
    /// Highest minus lowest pitch, in semitones.
    pub pitch_range: u8,
}

pub fn analyze_contour(phrases: &[MelodyPhrase]) -> ContourAnalysis {
    let pitches: Vec<u8> = phrases
        .iter()
        .flat_map(|p| p.notes.iter().map(|n| n.pitch))
        .collect();

    let intervals: Vec<i32> = pitches
        .windows(2)
        .map(|w| w[1] as i32 - w[0] as i32)
        .collect();

    let ascending = intervals.iter().filter(|&&i| i > 0).count();
    let descending = intervals.iter().filter(|&&i| i < 0).count();
    let (ascending_ratio, descending_ratio) = if intervals.is_empty() {
        (0.0, 0.0)
    } else {
        let n = intervals.len() as f64;
        (ascending as f64 / n, descending as f64 / n)
    };

    // Repeated notes do not break a run in either direction.
    let mut direction_changes = 0;
    let mut last_sign = 0;
    for &interval in &intervals {
        let sign = interval.signum();
        if sign == 0 {
            continue;
        }
        if last_sign != 0 && sign != last_sign {
            direction_changes += 1;
        }
        last_sign = sign;
    }

    let contour_type = if ascending == 0 && descending == 0 {
        ContourType::Static
    } else if ascending as f64 > DOMINANCE * descending as f64 {
        ContourType::Ascending
    } else if descending as f64 > DOMINANCE * ascending as f64 {
        ContourType::Descending
    } else {
        ContourType::Wave
    };

    let pitch_range = match (pitches.iter().max(), pitches.iter().min()) {
        (Some(high), Some(low)) => high - low,
        _ => 0,
    };

    ContourAnalysis {
        intervals,
        ascending_ratio,
        descending_ratio,
        direction_changes,
        contour_type,
        pitch_range,
    }
}
