// Key selection: mood + emotional arc (+ optional requested key) → scale
// instance.
//
// The mood table supplies the scale. Unknown moods borrow the default mood's
// tempo/energy/inflection but pick their scale from the average emotion
// (bright → major, dark → minor, otherwise dorian). The root comes from a
// small candidate list keyed by the sign of the average emotion and is the
// one random choice in key selection; the caller passes the `VoxRng`.
//
// A requested key pins the root, and the scale too when it names one that
// exists in the tables. Anything that cannot be honored is reported back as
// a `Fallback` rather than an error.

use crate::melody::Fallback;
use crate::scale::{ScaleInstance, parse_key};
use crate::tables::{MoodProfile, MusicTables};
use tracing::{debug, warn};
use versevox_prng::VoxRng;

/// Average emotion above which the root comes from the bright candidates.
const BRIGHT_THRESHOLD: f64 = 0.05;
/// Average emotion beyond which an unknown mood gets a major/minor scale.
const SCALE_THRESHOLD: f64 = 0.3;

/// The outcome of key selection.
#[derive(Debug, Clone)]
pub struct KeySelection {
    pub scale: ScaleInstance,
    /// Name of the mood whose profile was used (the default for unknowns).
    pub mood_name: String,
    pub mood: MoodProfile,
    pub fallbacks: Vec<Fallback>,
}

/// Pick scale and root.
pub fn select_key(
    tables: &MusicTables,
    emotional_arc: &[f64],
    mood: &str,
    key: Option<&str>,
    rng: &mut VoxRng,
) -> KeySelection {
    let average = if emotional_arc.is_empty() {
        0.0
    } else {
        emotional_arc.iter().sum::<f64>() / emotional_arc.len() as f64
    };
    let mut fallbacks = Vec::new();

    let (mood_name, profile, mut scale_name) = match tables.mood(mood) {
        Some(profile) => (mood.to_string(), profile.clone(), profile.scale.clone()),
        None => {
            let (default_name, default_profile) = tables.default_mood();
            let scale = scale_for_emotion(average);
            warn!(
                requested = mood,
                fallback = default_name,
                scale,
                "unknown mood, using default profile"
            );
            fallbacks.push(Fallback::UnknownMood {
                requested: mood.to_string(),
                fallback: default_name.to_string(),
            });
            (
                default_name.to_string(),
                default_profile.clone(),
                scale.to_string(),
            )
        }
    };

    let mut root_pc = None;
    if let Some(requested) = key {
        match parse_key(requested) {
            Some(parsed) if parsed.scale.as_deref().is_none_or(|s| tables.scale(s).is_some()) => {
                root_pc = Some(parsed.root_pc);
                if let Some(scale) = parsed.scale {
                    scale_name = scale;
                }
            }
            _ => {
                warn!(requested, "unparsable key, selecting from mood");
                fallbacks.push(Fallback::UnparsableKey {
                    requested: requested.to_string(),
                });
            }
        }
    }

    let root_pc = match root_pc {
        Some(pc) => pc,
        None => pick_root(tables, average, rng),
    };

    // Mood scales and key scales were both checked against the tables.
    let scale = tables
        .scale(&scale_name)
        .unwrap_or_else(|| tables.major_scale())
        .clone();
    let instance = ScaleInstance::new(scale, root_pc);
    debug!(key = %instance.key_name(), average, "key selected");

    KeySelection {
        scale: instance,
        mood_name,
        mood: profile,
        fallbacks,
    }
}

/// Scale name for a mood missing from the table.
pub fn scale_for_emotion(average: f64) -> &'static str {
    if average > SCALE_THRESHOLD {
        "major"
    } else if average < -SCALE_THRESHOLD {
        "minor"
    } else {
        "dorian"
    }
}

fn pick_root(tables: &MusicTables, average: f64, rng: &mut VoxRng) -> u8 {
    let roots = tables.root_candidates();
    let candidates = if average > BRIGHT_THRESHOLD {
        &roots.bright
    } else if average < -BRIGHT_THRESHOLD {
        &roots.dark
    } else {
        &roots.neutral
    };
    rng.choose(candidates).copied().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::default_tables;

    #[test]
    fn test_known_mood_uses_table_scale() {
        let tables = default_tables();
        let mut rng = VoxRng::new(7);
        let sel = select_key(&tables, &[0.5, 0.4], "sad", None, &mut rng);
        assert_eq!(sel.scale.scale.name, "minor");
        assert_eq!(sel.mood_name, "sad");
        assert!(sel.fallbacks.is_empty());
        // Bright arc → bright candidates.
        assert!(tables.root_candidates().bright.contains(&sel.scale.root_pc));
    }

    #[test]
    fn test_unknown_mood_falls_back() {
        let tables = default_tables();
        let mut rng = VoxRng::new(7);
        let sel = select_key(&tables, &[0.0], "confused", None, &mut rng);
        assert_eq!(sel.mood_name, "happy");
        assert_eq!(sel.scale.scale.name, "dorian");
        assert_eq!(
            sel.fallbacks,
            vec![Fallback::UnknownMood {
                requested: "confused".into(),
                fallback: "happy".into()
            }]
        );
        assert!(tables.root_candidates().neutral.contains(&sel.scale.root_pc));

        let sel = select_key(&tables, &[-0.6], "confused", None, &mut rng);
        assert_eq!(sel.scale.scale.name, "minor");
        assert!(tables.root_candidates().dark.contains(&sel.scale.root_pc));
    }

    #[test]
    fn test_scale_for_emotion_thresholds() {
        assert_eq!(scale_for_emotion(0.31), "major");
        assert_eq!(scale_for_emotion(0.3), "dorian");
        assert_eq!(scale_for_emotion(-0.31), "minor");
    }

    #[test]
    fn test_same_seed_same_root() {
        let tables = default_tables();
        let a = select_key(&tables, &[0.2], "happy", None, &mut VoxRng::new(99));
        let b = select_key(&tables, &[0.2], "happy", None, &mut VoxRng::new(99));
        assert_eq!(a.scale, b.scale);
    }

    #[test]
    fn test_requested_key_pins_root_and_scale() {
        let tables = default_tables();
        let mut rng = VoxRng::new(1);
        let sel = select_key(&tables, &[0.9], "happy", Some("Bb minor"), &mut rng);
        assert_eq!(sel.scale.root_pc, 10);
        assert_eq!(sel.scale.scale.name, "minor");
        assert_eq!(sel.scale.root_midi, 58);

        let sel = select_key(&tables, &[0.9], "happy", Some("F#"), &mut rng);
        assert_eq!(sel.scale.root_pc, 6);
        assert_eq!(sel.scale.scale.name, "major");
        assert!(sel.fallbacks.is_empty());
    }

    #[test]
    fn test_unparsable_key_reported() {
        let tables = default_tables();
        let mut rng = VoxRng::new(1);
        for bad in ["Q", "C superlocrian"] {
            let sel = select_key(&tables, &[0.9], "happy", Some(bad), &mut rng);
            assert_eq!(sel.scale.scale.name, "major");
            assert_eq!(
                sel.fallbacks,
                vec![Fallback::UnparsableKey {
                    requested: bad.into()
                }]
            );
        }
    }
}
