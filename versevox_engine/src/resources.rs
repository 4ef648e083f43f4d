// Read-only reference data shared by every generation: lexicon, phoneme
// inventory, music tables and voice tables.
//
// Built once from `EngineConfig`; each table comes from its override path
// when one is set, otherwise from the data embedded in its crate.

use crate::config::{ConfigError, EngineConfig};
use std::path::Path;
use tracing::info;
use versevox_lang::{Lexicon, PhonemeInventory, PhonemeTable, default_inventory, default_lexicon};
use versevox_music::MusicTables;
use versevox_voice::VoiceTables;

#[derive(Debug, Clone)]
pub struct EngineResources {
    pub lexicon: Lexicon,
    pub inventory: PhonemeInventory,
    pub music: MusicTables,
    pub voice: VoiceTables,
}

fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

impl EngineResources {
    /// The embedded tables with the stock defaults.
    pub fn embedded() -> Self {
        EngineResources {
            lexicon: default_lexicon(),
            inventory: default_inventory(),
            music: versevox_music::tables::default_tables(),
            voice: versevox_voice::tables::default_tables(),
        }
    }

    pub fn load(config: &EngineConfig) -> Result<Self, ConfigError> {
        let paths = &config.tables;

        let lexicon = match &paths.lexicon {
            Some(path) => Lexicon::from_json(&read(path)?)?,
            None => default_lexicon(),
        };

        let inventory = if paths.phonemes.is_empty() {
            default_inventory()
        } else {
            let tables = paths
                .phonemes
                .iter()
                .map(|path| -> Result<PhonemeTable, ConfigError> {
                    Ok(PhonemeTable::from_json(&read(path)?)?)
                })
                .collect::<Result<Vec<_>, _>>()?;
            PhonemeInventory::new(tables)?
        };

        let mut music = match &paths.music {
            Some(path) => MusicTables::from_json(&read(path)?)?,
            None => versevox_music::tables::default_tables(),
        };
        if !music.set_default_mood(&config.default_mood) {
            return Err(ConfigError::UnknownDefault {
                kind: "mood",
                name: config.default_mood.clone(),
            });
        }
        if !music.set_default_genre(&config.default_genre) {
            return Err(ConfigError::UnknownDefault {
                kind: "genre",
                name: config.default_genre.clone(),
            });
        }

        let voice = match &paths.voice {
            Some(path) => VoiceTables::from_json(&read(path)?)?,
            None => versevox_voice::tables::default_tables(),
        };

        info!(
            languages = inventory.languages().count(),
            moods = music.mood_names().count(),
            genres = music.genre_names().count(),
            "engine resources loaded"
        );

        Ok(EngineResources {
            lexicon,
            inventory,
            music,
            voice,
        })
    }
}
