// VerseVox generation engine.
//
// Wires the language, music and voice layers into one service object that
// takes a `GenerationRequest` and returns a melody plus a vocal synthesis
// plan. Reference data is loaded once and shared read-only; voice profiles
// and plan rendering come in through the traits in ports.rs, so callers (the
// CLI, tests, a future server) choose the storage and output.
//
// Architecture:
// - config.rs: `EngineConfig` (TOML), bounds, defaults, table overrides
// - resources.rs: `EngineResources` (lexicon, phonemes, music and voice tables)
// - request.rs: `GenerationRequest`
// - error.rs: `GenerationError`, `GenerationWarning`, store/render errors
// - ports.rs: `VoiceProfileStore`, `AudioRenderer` and their stock impls
// - service.rs: `VocalGenerationService` (single, batch, render)
// - main.rs: the `versevox` CLI
//
// Library code only emits `tracing` events; installing a subscriber is left
// to the binary.

pub mod config;
pub mod error;
pub mod ports;
pub mod request;
pub mod resources;
pub mod service;

pub use config::{ConfigError, EngineConfig, TablePaths};
pub use error::{GenerationError, GenerationWarning, RenderError, VoiceStoreError};
pub use ports::{AudioRenderer, InMemoryVoiceStore, JsonPlanRenderer, VoiceProfileStore};
pub use request::GenerationRequest;
pub use resources::EngineResources;
pub use service::{GenerationResult, RenderedGeneration, VocalGenerationService};
