// Lyrics analyzer: raw text → `LyricsAnalysis`.
//
// Steps, per non-blank line:
// 1. Normalize words (lowercase, letters only).
// 2. Count and split syllables (`syllables.rs`), look up or default stress.
// 3. Weight each word's emotion from the lexicon, falling back to negating
//    prefixes (-0.5×root) and common suffixes (0.8×root).
// 4. Average word weights into the line's emotional-arc value.
// Then label the whole text with a rhyme scheme from final-word endings.
//
// The only rejection is input with too few non-whitespace characters.

use crate::syllables::{count_syllables, split_syllables, stress_pattern};
use crate::types::{LyricsAnalysis, LyricsError, WordAnalysis};
use crate::Lexicon;
use tracing::debug;

const NEGATING_PREFIXES: [&str; 4] = ["un", "dis", "non", "in"];
const NEGATION_FACTOR: f64 = -0.5;

const EMOTION_SUFFIXES: [&str; 5] = ["ing", "ed", "ly", "ness", "ful"];
const SUFFIX_FACTOR: f64 = 0.8;

/// Tunables for the analyzer, normally filled from the engine config.
#[derive(Debug, Clone)]
pub struct AnalyzerSettings {
    /// Minimum non-whitespace characters for input to be accepted.
    pub min_chars: usize,
    /// Number of trailing characters of a line's final word compared for rhyme.
    pub rhyme_suffix_len: usize,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        AnalyzerSettings {
            min_chars: 10,
            rhyme_suffix_len: 2,
        }
    }
}

/// Analyze a block of lyrics.
pub fn analyze_lyrics(
    text: &str,
    lexicon: &Lexicon,
    settings: &AnalyzerSettings,
) -> Result<LyricsAnalysis, LyricsError> {
    let found = text.chars().filter(|c| !c.is_whitespace()).count();
    if found < settings.min_chars {
        return Err(LyricsError::TooShort {
            found,
            required: settings.min_chars,
        });
    }

    let lines: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();

    let mut emotional_arc = Vec::with_capacity(lines.len());
    let mut syllable_counts = Vec::with_capacity(lines.len());
    let mut stress_patterns = Vec::with_capacity(lines.len());
    let mut words = Vec::with_capacity(lines.len());

    for line in &lines {
        let analyzed: Vec<WordAnalysis> = line_words(line)
            .into_iter()
            .map(|w| analyze_word(w, lexicon))
            .collect();

        let emotion = if analyzed.is_empty() {
            0.0
        } else {
            analyzed.iter().map(|w| w.emotion).sum::<f64>() / analyzed.len() as f64
        };
        let stress: Vec<bool> = analyzed.iter().flat_map(|w| w.stress.iter().copied()).collect();

        emotional_arc.push(emotion);
        syllable_counts.push(stress.len());
        stress_patterns.push(stress);
        words.push(analyzed);
    }

    let rhyme_scheme = rhyme_scheme(&lines, settings.rhyme_suffix_len);
    let total_syllables = syllable_counts.iter().sum();

    debug!(
        lines = lines.len(),
        total_syllables,
        rhyme = ?rhyme_scheme,
        "lyrics analyzed"
    );

    Ok(LyricsAnalysis {
        lines,
        emotional_arc,
        syllable_counts,
        total_syllables,
        rhyme_scheme,
        stress_patterns,
        words,
    })
}

/// Lowercase letters-only form of a raw token; empty if it has no letters.
pub fn normalize_word(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Normalized words of a line, skipping tokens with no letters.
pub fn line_words(line: &str) -> Vec<String> {
    line.split_whitespace()
        .map(normalize_word)
        .filter(|w| !w.is_empty())
        .collect()
}

fn analyze_word(text: String, lexicon: &Lexicon) -> WordAnalysis {
    let count = count_syllables(&text, lexicon);
    let syllables = split_syllables(&text, count);
    let stress = stress_pattern(&text, count, lexicon);
    let emotion = word_emotion(&text, lexicon);
    WordAnalysis {
        text,
        syllables,
        stress,
        emotion,
    }
}

/// Emotion weight of a normalized word.
///
/// Direct lookup first; then a negating prefix over a known root
/// (`-0.5 × root`); then a common suffix over a known root or root+"e"
/// (`0.8 × root`); otherwise neutral.
pub fn word_emotion(word: &str, lexicon: &Lexicon) -> f64 {
    if let Some(weight) = lexicon.emotion_weight(word) {
        return weight;
    }

    for prefix in NEGATING_PREFIXES {
        let Some(root) = word.strip_prefix(prefix) else {
            continue;
        };
        if root.is_empty() {
            continue;
        }
        if let Some(base) = lexicon.emotion_weight(root) {
            return NEGATION_FACTOR * base;
        }
    }

    for suffix in EMOTION_SUFFIXES {
        let Some(root) = word.strip_suffix(suffix) else {
            continue;
        };
        if root.is_empty() {
            continue;
        }
        if let Some(base) = lexicon.emotion_weight(root) {
            return SUFFIX_FACTOR * base;
        }
        if let Some(base) = lexicon.emotion_weight(&format!("{root}e")) {
            return SUFFIX_FACTOR * base;
        }
    }

    0.0
}

/// Letter-class rhyme labels, one per line.
///
/// Lines whose final-word endings (last `min(suffix_len, len)` characters,
/// case-insensitive) match an ending already seen reuse that ending's letter;
/// new endings get the next letter in first-seen order. A line with no words
/// always gets a fresh letter.
pub fn rhyme_scheme(lines: &[String], suffix_len: usize) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    let mut next_class = 0usize;
    let mut scheme = Vec::with_capacity(lines.len());

    for line in lines {
        let Some(last) = line_words(line).pop() else {
            scheme.push(rhyme_letter(next_class));
            next_class += 1;
            seen.push(String::new());
            continue;
        };
        let chars: Vec<char> = last.chars().collect();
        let take = suffix_len.max(1).min(chars.len());
        let ending: String = chars[chars.len() - take..].iter().collect();

        let class = match seen.iter().position(|e| !e.is_empty() && *e == ending) {
            Some(existing) => existing_class(&scheme, existing),
            None => {
                let class = next_class;
                next_class += 1;
                class
            }
        };
        seen.push(ending);
        scheme.push(rhyme_letter(class));
    }

    scheme
}

/// The class index already assigned to line `line_idx`.
fn existing_class(scheme: &[String], line_idx: usize) -> usize {
    let label = &scheme[line_idx];
    let mut chars = label.chars();
    let letter = chars.next().map_or(0, |c| (c as u8 - b'a') as usize);
    let cycle: usize = chars.as_str().parse().unwrap_or(0);
    cycle * 26 + letter
}

/// `a`..`z`, then `a1`..`z1`, `a2`, ...
fn rhyme_letter(class: usize) -> String {
    let letter = (b'a' + (class % 26) as u8) as char;
    match class / 26 {
        0 => letter.to_string(),
        cycle => format!("{letter}{cycle}"),
    }
}
