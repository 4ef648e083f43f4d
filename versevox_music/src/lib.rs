// VerseVox melody layer.
//
// Takes a `LyricsAnalysis` from versevox_lang and produces a singable
// melody: one phrase per lyric line, one note per syllable, every pitch
// inside the selected key. All randomness (root choice, walk direction and
// step size, generation id) comes from a caller-supplied `VoxRng`, so a seed
// reproduces the melody exactly.
//
// Architecture:
// - tables.rs: Scales, mood and genre profiles, root candidates (JSON-loaded)
// - scale.rs: Scale patterns pinned to a root, degree snapping, key parsing
// - key.rs: Key selection from mood, emotional arc and an optional key name
// - composer.rs: Phrase/note generation (pitch walk, durations, velocities,
//   sections)
// - features.rs: Energy/valence/danceability estimates for the melody
// - melody.rs: Orchestration, fallbacks, generation id and content hash
// - contour.rs: Melodic contour summary
// - midi.rs: Standard MIDI File export with lyric events

pub mod composer;
pub mod contour;
pub mod features;
pub mod key;
pub mod melody;
pub mod midi;
pub mod scale;
pub mod tables;

pub use composer::{MelodyNote, MelodyPhrase, SectionType, midi_to_hz};
pub use contour::{ContourAnalysis, ContourType, analyze_contour};
pub use features::AudioFeatures;
pub use melody::{
    ComposedMelody, Fallback, GeneratedMelody, MelodyError, MelodyMetadata, MelodyParams,
    generate_melody,
};
pub use scale::{Scale, ScaleInstance};
pub use tables::{GenreProfile, Inflection, MoodProfile, MusicTableError, MusicTables};
