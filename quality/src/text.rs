//! Tokenization shared by the heuristics

use std::collections::HashSet;

use stresstest_core::round_to;

/// Compile a built-in pattern once
macro_rules! pattern {
    ($re:expr) => {{
        static RE: ::std::sync::OnceLock<::regex::Regex> = ::std::sync::OnceLock::new();
        RE.get_or_init(|| ::regex::Regex::new($re).expect("built-in pattern must compile"))
    }};
}
pub(crate) use pattern;

/// Whitespace separated words
pub fn words(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Non-empty, trimmed sentences, split on runs of `.`, `!` and `?`
pub fn sentences(text: &str) -> Vec<&str> {
    pattern!(r"[.!?]+")
        .split(text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Lowercased word tokens of at least `min_len` word characters
pub fn long_words(text: &str, min_len: usize) -> Vec<String> {
    pattern!(r"\w+")
        .find_iter(text)
        .map(|m| m.as_str())
        .filter(|w| w.chars().count() >= min_len)
        .map(str::to_lowercase)
        .collect()
}

/// Distinct lowercased tokens of at least `min_len` characters
pub fn long_word_set(text: &str, min_len: usize) -> HashSet<String> {
    long_words(text, min_len).into_iter().collect()
}

/// Plain text statistics reported next to the scores
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStats {
    /// Whitespace separated words
    pub word_count: usize,
    /// Non-empty sentences
    pub sentence_count: usize,
    /// Words per sentence, one decimal
    pub avg_sentence_length: f64,
    /// Distinct lowercased words over all words, three decimals
    pub unique_words_ratio: f64,
}

impl TextStats {
    /// Compute the statistics of `text`
    pub fn of(text: &str) -> Self {
        let words = words(text);
        let sentence_count = sentences(text).len();
        let unique: HashSet<String> = words.iter().map(|w| w.to_lowercase()).collect();

        Self {
            word_count: words.len(),
            sentence_count,
            avg_sentence_length: round_to(words.len() as f64 / sentence_count.max(1) as f64, 1),
            unique_words_ratio: round_to(unique.len() as f64 / words.len().max(1) as f64, 3),
        }
    }
}
