//! Individual heuristic scores
//!
//! Each function returns a value in [0, 1], higher is better. Scores are
//! unrounded; [`HeuristicEvaluator`](crate::HeuristicEvaluator) rounds
//! them when building the report.

use std::collections::{HashMap, HashSet};

use crate::text::{long_word_set, long_words, pattern, sentences, words};

const INTRO_MARKERS: &[&str] = &[
    "zunächst",
    "erstens",
    "um das zu",
    "lass uns",
    "stell dir vor",
    "kurz gesagt",
];

const CONCLUSION_MARKERS: &[&str] = &[
    "zusammenfassend",
    "fazit",
    "abschließend",
    "insgesamt",
    "kurz gesagt",
];

const NATURAL_MARKERS: &[&str] = &[
    "übrigens",
    "allerdings",
    "jedoch",
    "außerdem",
    "zudem",
    "deshalb",
    "daher",
];

const CONNECTORS: &[&str] = &[
    "deshalb",
    "daher",
    "folglich",
    "außerdem",
    "zudem",
    "jedoch",
    "allerdings",
    "trotzdem",
];

const CONTRADICTIONS: &[(&str, &str)] = &[
    ("immer", "nie"),
    ("alle", "keine"),
    ("möglich", "unmöglich"),
    ("richtig", "falsch"),
];

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

/// Paragraphs, lists, emphasis, a sensible length and examples
pub fn structure(answer: &str) -> f64 {
    let mut score: f64 = 0.0;

    if answer.contains('\n') {
        score += 1.0;
    }
    if pattern!(r"[•\-*]\s|\d+\.\s|[a-z]\)\s").is_match(answer) {
        score += 1.0;
    }
    if pattern!(r"\*\*.*?\*\*|__.*?__|##").is_match(answer) {
        score += 1.0;
    }

    let word_count = words(answer).len();
    if (50..=1000).contains(&word_count) {
        score += 1.0;
    } else if word_count > 1000 {
        score += 0.5;
    }

    if pattern!(r"beispiel|z\.?b\.?|etwa|wie|stell.*vor").is_match(&answer.to_lowercase()) {
        score += 1.0;
    }

    (score / 5.0).min(1.0)
}

/// Penalizes sentences above 20 words and words above 6 characters
pub fn readability(answer: &str) -> f64 {
    let sentence_count = sentences(answer).len();
    let words = words(answer);
    if sentence_count == 0 || words.is_empty() {
        return 0.0;
    }

    let avg_sentence_length = words.len() as f64 / sentence_count as f64;
    let avg_word_length =
        words.iter().map(|w| w.chars().count()).sum::<usize>() as f64 / words.len() as f64;

    let sentence_penalty = (avg_sentence_length - 20.0).max(0.0) / 50.0;
    let word_penalty = (avg_word_length - 6.0).max(0.0) / 10.0;

    (1.0 - (sentence_penalty + word_penalty)).clamp(0.0, 1.0)
}

/// Minimum length, question coverage, an introduction and a conclusion
pub fn completeness(answer: &str, question: &str) -> f64 {
    let mut score: f64 = 0.0;
    let answer_lower = answer.to_lowercase();

    if words(answer).len() >= 30 {
        score += 1.0;
    }

    let question_words = long_word_set(question, 4);
    if !question_words.is_empty() {
        let answer_words = long_word_set(answer, 4);
        let covered = question_words.intersection(&answer_words).count();
        score += covered as f64 / question_words.len() as f64;
    }

    if contains_any(&answer_lower, INTRO_MARKERS) {
        score += 1.0;
    }
    if contains_any(&answer_lower, CONCLUSION_MARKERS) {
        score += 1.0;
    }

    (score / 4.0).min(1.0)
}

/// Count immediately repeated words ("das das"), case sensitive,
/// without overlapping matches
fn repeated_words(answer: &str) -> usize {
    let tokens: Vec<regex::Match<'_>> = pattern!(r"\w+").find_iter(answer).collect();
    let mut count = 0;
    let mut i = 0;
    while i + 1 < tokens.len() {
        let (first, second) = (tokens[i], tokens[i + 1]);
        let gap = &answer[first.end()..second.start()];
        let whitespace_only = !gap.is_empty() && gap.chars().all(char::is_whitespace);
        if whitespace_only && first.as_str() == second.as_str() {
            count += 1;
            i += 2;
        } else {
            i += 1;
        }
    }
    count
}

/// Language errors, punctuation, varied sentence openings, natural connectors
pub fn fluency(answer: &str) -> f64 {
    let mut score: f64 = 0.0;

    let errors = repeated_words(answer) + pattern!(r"[a-z]\.[A-Z]").find_iter(answer).count();
    if errors == 0 {
        score += 1.0;
    } else if errors <= 2 {
        score += 0.5;
    }

    let parts: Vec<&str> = pattern!(r"[.!?]")
        .split(answer)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if parts.len() > 1 {
        score += 1.0;
    }

    if !parts.is_empty() {
        let openings: HashSet<String> = parts.iter().map(|s| s.chars().take(10).collect()).collect();
        score += openings.len() as f64 / parts.len() as f64;
    }

    if contains_any(&answer.to_lowercase(), NATURAL_MARKERS) {
        score += 1.0;
    }

    (score / 4.0).min(1.0)
}

/// Logical connectors, recurring vocabulary and paragraph structure
pub fn coherence(answer: &str) -> f64 {
    let mut score: f64 = 0.0;
    let lower = answer.to_lowercase();

    let connectors = CONNECTORS.iter().filter(|c| lower.contains(*c)).count();
    score += (connectors as f64 / 3.0).min(1.0);

    let tokens = long_words(answer, 4);
    if !tokens.is_empty() {
        let mut freq: HashMap<&str, usize> = HashMap::new();
        for token in &tokens {
            *freq.entry(token.as_str()).or_default() += 1;
        }
        let recurring = freq.values().filter(|&&n| n >= 2).count();
        score += (recurring as f64 / freq.len() as f64 * 2.0).min(1.0);
    }

    if answer.split("\n\n").count() > 1 {
        score += 1.0;
    }

    (score / 3.0).min(1.0)
}

/// Starts at 1 and deducts for repeated figures and contradicting pairs
pub fn factual_consistency(answer: &str) -> f64 {
    let mut score: f64 = 1.0;
    let lower = answer.to_lowercase();

    let numbers: Vec<&str> = pattern!(r"\b\d+\b").find_iter(answer).map(|m| m.as_str()).collect();
    let distinct: HashSet<&str> = numbers.iter().copied().collect();
    if numbers.len() > 1 && distinct.len() != numbers.len() {
        score -= 0.1;
    }

    for (positive, negative) in CONTRADICTIONS {
        if lower.contains(positive) && lower.contains(negative) {
            score -= 0.2;
        }
    }

    score.max(0.0)
}
