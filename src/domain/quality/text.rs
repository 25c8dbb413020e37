//! Text heuristics shared by the scoring dimensions

use once_cell::sync::Lazy;
use regex::Regex;

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-zA-Z0-9']+").expect("valid regex"));

/// Lowercased word tokens of a text blob
pub fn tokenize(text: &str) -> Vec<String> {
    WORD_RE
        .find_iter(text)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

/// Sentence count, clamped to at least 1 for non-empty text
pub fn sentence_count(text: &str) -> usize {
    let count = text
        .split(['.', '!', '?'])
        .filter(|s| !s.trim().is_empty())
        .count();
    count.max(1)
}

/// Syllable estimate for a single word.
///
/// Vowel-group heuristic with a silent-e correction; close enough for a
/// reading-ease formula over marketing copy.
pub fn syllables(word: &str) -> usize {
    let word = word.to_lowercase();
    let mut count = 0;
    let mut prev_vowel = false;

    for ch in word.chars() {
        let is_vowel = matches!(ch, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
        if is_vowel && !prev_vowel {
            count += 1;
        }
        prev_vowel = is_vowel;
    }

    if word.ends_with('e') && !word.ends_with("le") && count > 1 {
        count -= 1;
    }

    count.max(1)
}

/// Flesch reading-ease of a text blob, clamped to [0, 100].
///
/// Returns `None` when the text contains no words.
pub fn flesch_reading_ease(text: &str) -> Option<f64> {
    let words = tokenize(text);

    if words.is_empty() {
        return None;
    }

    let word_count = words.len() as f64;
    let sentence_count = sentence_count(text) as f64;
    let syllable_count: usize = words.iter().map(|w| syllables(w)).sum();

    let score = 206.835 - 1.015 * (word_count / sentence_count)
        - 84.6 * (syllable_count as f64 / word_count);

    Some(score.clamp(0.0, 100.0))
}
