//! Question/answer relevance

use std::collections::HashSet;

use stresstest_core::QualityError;

use crate::text::long_words;

const STOPWORDS: &[&str] = &[
    "der", "die", "das", "und", "oder", "aber", "in", "auf", "mit", "zu", "ist", "sind", "was",
    "wie", "wo", "wann", "warum",
];

/// Turns text into a dense vector
///
/// Implementations must be usable from several threads; the evaluator is
/// shared across the whole run.
pub trait Embedder: Send + Sync {
    /// Model name for logging
    fn name(&self) -> &str;

    /// Embed a single text
    fn embed(&self, text: &str) -> Result<Vec<f32>, QualityError>;
}

/// How relevance is measured
pub enum RelevanceBackend {
    /// Cosine similarity of embeddings, keyword overlap when embedding fails
    Semantic(Box<dyn Embedder>),

    /// Jaccard overlap of content words
    KeywordOverlap,
}

impl RelevanceBackend {
    /// Short name for logging
    pub fn name(&self) -> &str {
        match self {
            Self::Semantic(embedder) => embedder.name(),
            Self::KeywordOverlap => "keyword-overlap",
        }
    }

    /// Relevance of `answer` to `question` in [0, 1]
    pub fn score(&self, question: &str, answer: &str) -> f64 {
        match self {
            Self::Semantic(embedder) => match semantic_relevance(embedder.as_ref(), question, answer) {
                Ok(score) => score,
                Err(e) => {
                    tracing::warn!(
                        embedder = embedder.name(),
                        error = %e,
                        "Semantic relevance failed, using keyword overlap"
                    );
                    keyword_relevance(question, answer)
                }
            },
            Self::KeywordOverlap => keyword_relevance(question, answer),
        }
    }
}

impl std::fmt::Debug for RelevanceBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("RelevanceBackend").field(&self.name()).finish()
    }
}

fn semantic_relevance(
    embedder: &dyn Embedder,
    question: &str,
    answer: &str,
) -> Result<f64, QualityError> {
    let q = embedder.embed(question)?;
    let a = embedder.embed(answer)?;
    let similarity = cosine_similarity(&q, &a).ok_or_else(|| {
        QualityError::Backend(format!(
            "embedding mismatch: {} vs {} dimensions",
            q.len(),
            a.len()
        ))
    })?;
    Ok(similarity.clamp(0.0, 1.0))
}

/// Cosine similarity, `None` for mismatched dimensions or zero vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.len() != b.len() || a.is_empty() {
        return None;
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0f64, 0.0f64, 0.0f64);
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }
    Some(dot / (norm_a.sqrt() * norm_b.sqrt()))
}

fn content_words(text: &str) -> HashSet<String> {
    long_words(text, 3)
        .into_iter()
        .filter(|w| !STOPWORDS.contains(&w.as_str()))
        .collect()
}

/// Jaccard similarity of the content words of question and answer
///
/// A question without content words scores a neutral 0.5.
pub fn keyword_relevance(question: &str, answer: &str) -> f64 {
    let question_words = content_words(question);
    if question_words.is_empty() {
        return 0.5;
    }

    let answer_words = content_words(answer);
    let intersection = question_words.intersection(&answer_words).count();
    let union = question_words.union(&answer_words).count();

    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}
