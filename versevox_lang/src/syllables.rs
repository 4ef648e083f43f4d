// Syllable counting, splitting and default stress for English-like lyrics.
//
// Counting uses the vowel-group heuristic (each run of a/e/i/o/u/y is one
// syllable) with three corrections: silent trailing "e", and non-syllabic
// "-ed"/"-es" endings on longer words. The lexicon's exception table wins
// outright over the heuristic.
//
// Splitting produces the text labels attached to melody notes. Consonants
// between two vowel groups are shared out VC-CV style (a single consonant
// starts the next syllable), then chunks are merged or split until the
// count matches exactly.

use crate::Lexicon;

const VOWELS: [char; 6] = ['a', 'e', 'i', 'o', 'u', 'y'];

fn is_vowel(c: char) -> bool {
    VOWELS.contains(&c)
}

/// Syllable count for a normalized word, honoring the exception table.
pub fn count_syllables(word: &str, lexicon: &Lexicon) -> usize {
    lexicon
        .syllable_exception(word)
        .unwrap_or_else(|| heuristic_syllables(word))
}

/// Vowel-group syllable estimate with the silent-e and suffix corrections.
pub fn heuristic_syllables(word: &str) -> usize {
    let chars: Vec<char> = word.chars().collect();
    let n = chars.len();

    let mut count = 0usize;
    let mut prev_vowel = false;
    for &c in &chars {
        let v = is_vowel(c);
        if v && !prev_vowel {
            count += 1;
        }
        prev_vowel = v;
    }

    if count > 1 && n >= 2 && chars[n - 1] == 'e' && !is_vowel(chars[n - 2]) {
        // "-le" after a consonant keeps its syllable: "lit-tle", "ta-ble".
        let consonant_le = n >= 3 && chars[n - 2] == 'l' && !is_vowel(chars[n - 3]);
        if !consonant_le {
            count -= 1;
        }
    }

    if count > 1 && n > 4 && word.ends_with("ed") && !matches!(chars[n - 3], 't' | 'd') {
        count -= 1;
    }

    if count > 1 && n > 4 && word.ends_with("es") {
        let sibilant = matches!(chars[n - 3], 's' | 'x' | 'z' | 'c' | 'g')
            || word.ends_with("ches")
            || word.ends_with("shes");
        if !sibilant {
            count -= 1;
        }
    }

    count.max(1)
}

/// Split a word into exactly `count` text chunks.
pub fn split_syllables(word: &str, count: usize) -> Vec<String> {
    let count = count.max(1);
    let chars: Vec<char> = word.chars().collect();
    if chars.is_empty() {
        return vec![String::new(); count];
    }

    // Start index of every vowel group.
    let mut group_starts = Vec::new();
    let mut prev_vowel = false;
    for (i, &c) in chars.iter().enumerate() {
        let v = is_vowel(c);
        if v && !prev_vowel {
            group_starts.push(i);
        }
        prev_vowel = v;
    }

    let mut boundaries = vec![0usize];
    for pair in group_starts.windows(2) {
        let (prev_start, next_start) = (pair[0], pair[1]);
        let prev_end = (prev_start..next_start)
            .take_while(|&i| is_vowel(chars[i]))
            .last()
            .map_or(prev_start, |i| i + 1);
        let consonants = next_start - prev_end;
        boundaries.push(prev_end + consonants / 2);
    }

    let mut chunks: Vec<String> = boundaries
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = boundaries.get(i + 1).copied().unwrap_or(chars.len());
            chars[start..end].iter().collect()
        })
        .collect();

    while chunks.len() > count {
        let tail = chunks.pop().unwrap_or_default();
        if let Some(last) = chunks.last_mut() {
            last.push_str(&tail);
        }
    }

    while chunks.len() < count {
        let (idx, longest) = chunks
            .iter()
            .enumerate()
            .max_by_key(|(i, c)| (c.chars().count(), usize::MAX - i))
            .map(|(i, c)| (i, c.chars().count()))
            .unwrap_or((0, 0));
        if longest < 2 {
            // Nothing left to split: hold the final chunk as a melisma.
            let last = chunks.last().cloned().unwrap_or_default();
            chunks.push(last);
            continue;
        }
        let piece: Vec<char> = chunks[idx].chars().collect();
        let mid = piece.len() / 2;
        chunks[idx] = piece[..mid].iter().collect();
        chunks.insert(idx + 1, piece[mid..].iter().collect());
    }

    chunks
}

/// Default stress for a word with no table entry.
///
/// 1 → stressed, 2 → trochee, 3 → dactyl, longer → alternating from stressed.
pub fn default_stress(count: usize) -> Vec<bool> {
    match count {
        0 | 1 => vec![true],
        2 => vec![true, false],
        3 => vec![true, false, false],
        n => (0..n).map(|i| i % 2 == 0).collect(),
    }
}

/// Stress pattern for a word: the lexicon entry when its length matches the
/// syllable count, otherwise the default for that count.
pub fn stress_pattern(word: &str, count: usize, lexicon: &Lexicon) -> Vec<bool> {
    match lexicon.stress_pattern(word) {
        Some(pattern) if pattern.len() == count => pattern.to_vec(),
        Some(pattern) => {
            tracing::debug!(
                word,
                table_len = pattern.len(),
                count,
                "stress entry length mismatch, using default"
            );
            default_stress(count)
        }
        None => default_stress(count),
    }
}
