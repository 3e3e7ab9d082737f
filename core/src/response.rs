//! Response types: chat completions, quality reports, per-question results

pub use crate::error::ErrorKind;

use serde::{Deserialize, Serialize};

use crate::metrics::round_to;

/// Answer recorded when a request exceeded its timeout
pub const TIMEOUT_SENTINEL: &str = "TIMEOUT_ERROR";

/// Prefix of the answer recorded for any other request failure
pub const ERROR_PREFIX: &str = "ERROR: ";

/// Whether an answer is one of the failure sentinels rather than model output
pub fn is_error_answer(answer: &str) -> bool {
    answer == TIMEOUT_SENTINEL || answer.starts_with(ERROR_PREFIX)
}

/// A completed chat request as returned by the server
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletion {
    /// Text of the first choice
    pub content: String,

    /// Server-reported completion tokens, 0 when usage is absent
    pub completion_tokens: u32,

    /// Why generation stopped, if reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

impl ChatCompletion {
    /// Create a completion with content and token count
    pub fn new(content: impl Into<String>, completion_tokens: u32) -> Self {
        Self {
            content: content.into(),
            completion_tokens,
            finish_reason: None,
        }
    }
}

/// Heuristic quality scores for one answer
///
/// Every score lies in [0, 1] and is rounded to three decimals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    /// Weighted overall score
    #[serde(alias = "overall_quality")]
    pub overall: f64,

    /// Headings, lists, paragraphs, emphasis, code
    #[serde(alias = "structure_score")]
    pub structure: f64,

    /// Sentence and word length
    #[serde(alias = "readability_score")]
    pub readability: f64,

    /// Length, intro, conclusion, examples
    #[serde(alias = "completeness_score")]
    pub completeness: f64,

    /// Similarity between question and answer
    #[serde(alias = "relevance_score")]
    pub relevance: f64,

    /// Absence of contradictions and repeated figures
    pub factual_consistency: f64,

    /// Repetition, punctuation, sentence variety
    #[serde(alias = "fluency_score")]
    pub fluency: f64,

    /// Connectors, recurring vocabulary, paragraphs
    #[serde(alias = "coherence_score")]
    pub coherence: f64,

    /// Number of words
    pub word_count: usize,

    /// Number of sentences
    pub sentence_count: usize,

    /// Words per sentence, rounded to one decimal
    pub avg_sentence_length: f64,

    /// Distinct words over all words
    pub unique_words_ratio: f64,
}

/// Outcome of one question
///
/// Created exactly once per question and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionResult {
    /// Prompt text
    pub question: String,

    /// Model answer, or a failure sentinel
    pub answer: String,

    /// Wall-clock latency in milliseconds, rounded to 0.1
    #[serde(alias = "time")]
    pub elapsed_ms: f64,

    /// Server-reported completion tokens
    #[serde(alias = "token")]
    pub completion_tokens: u32,

    /// Overall quality score, 0 when not scored
    #[serde(default)]
    pub quality: f64,

    /// Full quality report, when scored
    #[serde(default, alias = "quality_metrics")]
    pub quality_detail: Option<QualityReport>,

    /// Failure classification, absent on success
    #[serde(default)]
    pub error: Option<ErrorKind>,
}

impl QuestionResult {
    /// Successful request, not yet scored
    pub fn success(
        question: impl Into<String>,
        answer: impl Into<String>,
        elapsed_ms: f64,
        completion_tokens: u32,
    ) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            elapsed_ms: round_to(elapsed_ms, 1),
            completion_tokens,
            quality: 0.0,
            quality_detail: None,
            error: None,
        }
    }

    /// Failed request; the answer becomes the matching sentinel
    pub fn failure(
        question: impl Into<String>,
        kind: ErrorKind,
        message: impl std::fmt::Display,
        elapsed_ms: f64,
    ) -> Self {
        let answer = if kind.is_timeout() {
            TIMEOUT_SENTINEL.to_string()
        } else {
            format!("{ERROR_PREFIX}{message}")
        };

        Self {
            question: question.into(),
            answer,
            elapsed_ms: round_to(elapsed_ms, 1),
            completion_tokens: 0,
            quality: 0.0,
            quality_detail: None,
            error: Some(kind),
        }
    }

    /// Attach a quality report
    pub fn with_quality(mut self, report: QualityReport) -> Self {
        self.quality = report.overall;
        self.quality_detail = Some(report);
        self
    }

    /// No error tag and a positive latency
    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.elapsed_ms > 0.0
    }

    /// Whether this result timed out
    pub fn is_timeout(&self) -> bool {
        self.error.is_some_and(|kind| kind.is_timeout())
    }
}
