// VerseVox voice layer.
//
// Turns a generated melody into a vocal synthesis plan: every phoneme of
// every lyric line placed in time under its notes, shaped by a voice
// profile, and described as pitch samples, a spectral envelope, harmonics,
// noise and an amplitude envelope, with mix settings on top. No audio is
// rendered here.
//
// Architecture:
// - tables.rs: Default voice, vowel formant shifts, spectral multipliers,
//   genre timbre/EQ/reverb presets (JSON-loaded)
// - profile.rs: `VoiceProfile` (formants, envelope, vibrato, origin)
// - align.rs: Proportional phoneme timing, overlapping notes, pitch targets,
//   onset/nucleus/coda
// - characteristics.rs: Formant selection and shifting, spectral shape,
//   singing adjustments, per-phoneme vibrato
// - f0.rs: Pitch contours (glide + vibrato + mood inflection)
// - spectral.rs: Binned formant envelopes, harmonic series, noise
// - expressive.rs: Dynamics, ADSR envelopes, harmony voices
// - assembly.rs: Ordered plan, EQ/compression/reverb/final mix, quality scores
// - plan.rs: Stage driver (`synthesize_plan`)

pub mod align;
pub mod assembly;
pub mod characteristics;
pub mod expressive;
pub mod f0;
pub mod plan;
pub mod profile;
pub mod spectral;
pub mod tables;

pub use align::{AlignedLine, AlignedPhoneme, SyllablePosition};
pub use assembly::{MixParameters, ProcessingMetadata, VocalSynthesisPlan};
pub use characteristics::{VoicedLine, VoicedPhoneme};
pub use expressive::HarmonyInterval;
pub use plan::{VoiceSettings, synthesize_plan};
pub use profile::{Formant, ProfileError, SpectralEnvelope, Vibrato, VoiceOrigin, VoiceProfile};
pub use spectral::SpectralSettings;
pub use tables::{VoiceTableError, VoiceTables};
