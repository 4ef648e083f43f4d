// Grapheme-to-phoneme transcription.
//
// Each language has a `PhonemeTable` mapping graphemes of one to three
// letters to a phoneme (symbol, nominal duration, kind). Transcription scans
// the lowercased text left to right, trying the longest grapheme first
// (trigram, digraph, single letter). At each length the requested language's
// table is tried before the English table, so a partial table (Spanish) still
// transcribes loanword spellings.
//
// Transcription never fails: letters with no entry become an `Unknown`
// phoneme lasting `UNKNOWN_DURATION`, and anything that is not a letter
// (spaces, digits, punctuation) is skipped.
//
// Tables ship in `data/phonemes/*.json` and are embedded by
// `default_inventory()`.

use crate::types::{Phoneme, PhonemeKind, TableError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Language every inventory must provide; also the per-entry fallback.
pub const FALLBACK_LANGUAGE: &str = "en";

/// Duration given to letters with no table entry.
pub const UNKNOWN_DURATION: f64 = 0.05;

/// Longest grapheme the tables may contain.
const MAX_GRAPH_LEN: usize = 3;

/// One grapheme → phoneme mapping as stored in JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhonemeEntry {
    pub graph: String,
    pub symbol: String,
    pub duration: f64,
    pub kind: PhonemeKind,
}

#[derive(Debug, Deserialize)]
struct PhonemeTableFile {
    language: String,
    entries: Vec<PhonemeEntry>,
}

/// All grapheme mappings for one language.
#[derive(Debug, Clone)]
pub struct PhonemeTable {
    language: String,
    by_graph: BTreeMap<String, PhonemeEntry>,
}

impl PhonemeTable {
    /// Parse and validate a table from JSON.
    pub fn from_json(json: &str) -> Result<Self, TableError> {
        let file: PhonemeTableFile = serde_json::from_str(json)?;
        let mut by_graph = BTreeMap::new();
        for entry in file.entries {
            let len = entry.graph.chars().count();
            if len == 0 || len > MAX_GRAPH_LEN {
                return Err(TableError::InvalidEntry {
                    key: entry.graph,
                    reason: format!("grapheme must have 1..={MAX_GRAPH_LEN} letters"),
                });
            }
            if entry.duration <= 0.0 || entry.symbol.is_empty() {
                return Err(TableError::InvalidEntry {
                    key: entry.graph,
                    reason: "entries need a symbol and a positive duration".into(),
                });
            }
            by_graph.insert(entry.graph.to_lowercase(), entry);
        }
        Ok(PhonemeTable {
            language: file.language,
            by_graph,
        })
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn lookup(&self, graph: &str) -> Option<&PhonemeEntry> {
        self.by_graph.get(graph)
    }

    pub fn len(&self) -> usize {
        self.by_graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_graph.is_empty()
    }
}

/// The set of phoneme tables available to the transcriber, keyed by
/// language code.
#[derive(Debug, Clone)]
pub struct PhonemeInventory {
    tables: BTreeMap<String, PhonemeTable>,
}

impl PhonemeInventory {
    /// Build an inventory. The English table is mandatory.
    pub fn new(tables: Vec<PhonemeTable>) -> Result<Self, TableError> {
        let tables: BTreeMap<String, PhonemeTable> = tables
            .into_iter()
            .map(|t| (t.language.clone(), t))
            .collect();
        if !tables.contains_key(FALLBACK_LANGUAGE) {
            return Err(TableError::MissingFallback(FALLBACK_LANGUAGE.to_string()));
        }
        Ok(PhonemeInventory { tables })
    }

    pub fn supports(&self, language: &str) -> bool {
        self.tables.contains_key(language)
    }

    pub fn languages(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    fn fallback(&self) -> &PhonemeTable {
        // Presence checked in `new`.
        &self.tables[FALLBACK_LANGUAGE]
    }

    /// Transcribe text into phonemes tagged with `singing_style`.
    ///
    /// Unsupported language codes transcribe with the English table.
    pub fn transcribe(&self, text: &str, language: &str, singing_style: &str) -> Vec<Phoneme> {
        let fallback = self.fallback();
        let primary = self.tables.get(language).unwrap_or_else(|| {
            debug!(language, "no phoneme table for language, using fallback");
            fallback
        });

        let chars: Vec<char> = text.chars().flat_map(char::to_lowercase).collect();
        let mut phonemes = Vec::new();
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            if !c.is_alphabetic() {
                i += 1;
                continue;
            }

            let mut matched = None;
            for len in (1..=MAX_GRAPH_LEN).rev() {
                if i + len > chars.len() || !chars[i..i + len].iter().all(|c| c.is_alphabetic()) {
                    continue;
                }
                let graph: String = chars[i..i + len].iter().collect();
                if let Some(entry) = primary.lookup(&graph).or_else(|| fallback.lookup(&graph)) {
                    matched = Some((entry, len));
                    break;
                }
            }

            match matched {
                Some((entry, len)) => {
                    phonemes.push(Phoneme {
                        symbol: entry.symbol.clone(),
                        base_duration: entry.duration,
                        kind: entry.kind,
                        singing_style: singing_style.to_string(),
                    });
                    i += len;
                }
                None => {
                    phonemes.push(Phoneme {
                        symbol: c.to_string(),
                        base_duration: UNKNOWN_DURATION,
                        kind: PhonemeKind::Unknown,
                        singing_style: singing_style.to_string(),
                    });
                    i += 1;
                }
            }
        }

        phonemes
    }
}

/// Load the English and Spanish tables embedded at compile time.
///
/// Panics if the embedded JSON is malformed (caught by the tests below).
pub fn default_inventory() -> PhonemeInventory {
    let en = PhonemeTable::from_json(include_str!("../../data/phonemes/en.json"))
        .expect("embedded phonemes/en.json is malformed");
    let es = PhonemeTable::from_json(include_str!("../../data/phonemes/es.json"))
        .expect("embedded phonemes/es.json is malformed");
    PhonemeInventory::new(vec![en, es]).expect("embedded inventory lacks English")
}
