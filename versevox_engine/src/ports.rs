// Collaborators the service talks to at its edges: where voice profiles come
// from and where finished plans go.

use crate::error::{RenderError, VoiceStoreError};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::debug;
use versevox_voice::{ProfileError, VocalSynthesisPlan, VoiceProfile, VoiceTables};

pub trait VoiceProfileStore: Send + Sync {
    fn get(&self, profile_ref: &str) -> Result<VoiceProfile, VoiceStoreError>;
}

/// Profiles held in memory, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct InMemoryVoiceStore {
    profiles: BTreeMap<String, VoiceProfile>,
}

impl InMemoryVoiceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding only the tables' default voice.
    pub fn with_default(tables: &VoiceTables) -> Self {
        let mut store = Self::new();
        store.insert(tables.default_profile().clone());
        store
    }

    /// Insert or replace a profile.
    pub fn insert(&mut self, profile: VoiceProfile) {
        self.profiles.insert(profile.id.clone(), profile);
    }

    /// Parse, validate and insert a profile, returning its id.
    pub fn insert_json(&mut self, json: &str) -> Result<String, ProfileError> {
        let profile = VoiceProfile::from_json(json)?;
        let id = profile.id.clone();
        self.insert(profile);
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl VoiceProfileStore for InMemoryVoiceStore {
    fn get(&self, profile_ref: &str) -> Result<VoiceProfile, VoiceStoreError> {
        self.profiles
            .get(profile_ref)
            .cloned()
            .ok_or_else(|| VoiceStoreError::NotFound {
                id: profile_ref.to_string(),
            })
    }
}

/// Turns a synthesis plan into stored output and returns where it went.
pub trait AudioRenderer {
    fn render(&self, name: &str, plan: &VocalSynthesisPlan) -> Result<String, RenderError>;
}

/// Writes `<dir>/<name>.plan.json` and returns a `file://` URI.
#[derive(Debug, Clone)]
pub struct JsonPlanRenderer {
    dir: PathBuf,
}

impl JsonPlanRenderer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        JsonPlanRenderer { dir: dir.into() }
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.plan.json"))
    }
}

impl AudioRenderer for JsonPlanRenderer {
    fn render(&self, name: &str, plan: &VocalSynthesisPlan) -> Result<String, RenderError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(name);
        let mut writer = BufWriter::new(File::create(&path)?);
        serde_json::to_writer_pretty(&mut writer, plan)?;
        // Flush here; errors from the drop-time flush would be lost.
        writer.flush()?;
        let path = std::fs::canonicalize(&path)?;
        debug!(path = %path.display(), "plan written");
        Ok(format!("file://{}", path.display()))
    }
}
