//! Weighted heuristic evaluator

use stresstest_core::{round_to, QualityError, QualityEvaluator, QualityReport};

use crate::heuristics;
use crate::relevance::{Embedder, RelevanceBackend};
use crate::text::TextStats;

const PROBE_TEXT: &str = "Test";

/// Weight of each sub-score in the overall score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Weights {
    /// Relevance to the question
    pub relevance: f64,
    /// Completeness
    pub completeness: f64,
    /// Fluency
    pub fluency: f64,
    /// Structure
    pub structure: f64,
    /// Coherence
    pub coherence: f64,
    /// Readability
    pub readability: f64,
    /// Factual consistency
    pub factual: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            relevance: 0.25,
            completeness: 0.20,
            fluency: 0.15,
            structure: 0.15,
            coherence: 0.10,
            readability: 0.10,
            factual: 0.05,
        }
    }
}

/// Scores answers with lexical heuristics
#[derive(Debug)]
pub struct HeuristicEvaluator {
    relevance: RelevanceBackend,
    weights: Weights,
}

impl Default for HeuristicEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl HeuristicEvaluator {
    /// Evaluator with keyword-overlap relevance
    pub fn new() -> Self {
        Self {
            relevance: RelevanceBackend::KeywordOverlap,
            weights: Weights::default(),
        }
    }

    /// Evaluator with embedding-based relevance
    ///
    /// This crate ships no [`Embedder`]; callers bring their own model.
    /// Use [`HeuristicEvaluator::detect`] to fall back when it is unusable.
    pub fn with_embedder(embedder: Box<dyn Embedder>) -> Self {
        Self {
            relevance: RelevanceBackend::Semantic(embedder),
            weights: Weights::default(),
        }
    }

    /// Richest relevance backend that works
    ///
    /// A candidate embedder is used only if it embeds a short test text;
    /// otherwise, or without a candidate, keyword overlap is used.
    pub fn detect(candidate: Option<Box<dyn Embedder>>) -> Self {
        let evaluator = match candidate {
            Some(embedder) => match embedder.embed(PROBE_TEXT) {
                Ok(vector) if !vector.is_empty() => Self::with_embedder(embedder),
                Ok(_) => {
                    tracing::warn!(embedder = embedder.name(), "Embedder returned an empty vector");
                    Self::new()
                }
                Err(e) => {
                    tracing::warn!(embedder = embedder.name(), error = %e, "Embedder unavailable");
                    Self::new()
                }
            },
            None => Self::new(),
        };
        tracing::info!(backend = evaluator.relevance.name(), "Relevance backend selected");
        evaluator
    }

    /// Replace the weights
    pub fn with_weights(mut self, weights: Weights) -> Self {
        self.weights = weights;
        self
    }

    /// Active relevance backend
    pub fn relevance_backend(&self) -> &RelevanceBackend {
        &self.relevance
    }

    /// Score one answer
    pub fn report(&self, question: &str, answer: &str) -> QualityReport {
        let structure = heuristics::structure(answer);
        let readability = heuristics::readability(answer);
        let completeness = heuristics::completeness(answer, question);
        let relevance = self.relevance.score(question, answer);
        let factual_consistency = heuristics::factual_consistency(answer);
        let fluency = heuristics::fluency(answer);
        let coherence = heuristics::coherence(answer);

        let w = &self.weights;
        let overall = relevance * w.relevance
            + completeness * w.completeness
            + fluency * w.fluency
            + structure * w.structure
            + coherence * w.coherence
            + readability * w.readability
            + factual_consistency * w.factual;

        let stats = TextStats::of(answer);

        QualityReport {
            overall: round_to(overall, 3),
            structure: round_to(structure, 3),
            readability: round_to(readability, 3),
            completeness: round_to(completeness, 3),
            relevance: round_to(relevance, 3),
            factual_consistency: round_to(factual_consistency, 3),
            fluency: round_to(fluency, 3),
            coherence: round_to(coherence, 3),
            word_count: stats.word_count,
            sentence_count: stats.sentence_count,
            avg_sentence_length: stats.avg_sentence_length,
            unique_words_ratio: stats.unique_words_ratio,
        }
    }
}

impl QualityEvaluator for HeuristicEvaluator {
    fn name(&self) -> &str {
        "heuristic"
    }

    fn evaluate(&self, question: &str, answer: &str) -> Result<QualityReport, QualityError> {
        if answer.trim().is_empty() {
            return Err(QualityError::InvalidInput("empty answer".into()));
        }

        let report = self.report(question, answer);
        tracing::trace!(
            overall = report.overall,
            relevance = report.relevance,
            words = report.word_count,
            backend = self.relevance.name(),
            "Scored answer"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUESTION: &str = "Erkläre die Speicherverwaltung in Rust";

    const GOOD_ANSWER: &str = "## Speicherverwaltung in Rust\n\n\
        Zunächst ein Überblick: Rust verwaltet Speicher über Ownership. Jeder Wert hat genau einen Besitzer. \
        Wenn der Besitzer den Gültigkeitsbereich verlässt, wird der Speicher freigegeben.\n\n\
        - Borrowing erlaubt Referenzen ohne Besitzübergabe.\n\
        - Lifetimes beschreiben, wie lange Referenzen gültig bleiben.\n\n\
        Zum Beispiel kann eine Funktion einen String ausleihen. Deshalb entstehen keine doppelten Freigaben. \
        Außerdem prüft der Compiler alle Regeln zur Übersetzungszeit. Jedoch kostet das anfangs Lernzeit. \
        Zusammenfassend bietet Rust sichere Speicherverwaltung ohne Garbage Collector.";

    #[test]
    fn test_scores_in_unit_range() {
        let evaluator = HeuristicEvaluator::new();
        for answer in [GOOD_ANSWER, "Ja.", "x", "1 1 1 1 immer nie"] {
            let report = evaluator.evaluate(QUESTION, answer).unwrap();
            for score in [
                report.overall,
                report.structure,
                report.readability,
                report.completeness,
                report.relevance,
                report.factual_consistency,
                report.fluency,
                report.coherence,
            ] {
                assert!((0.0..=1.0).contains(&score), "{score} out of range for {answer:?}");
            }
        }
    }

    #[test]
    fn test_structured_answer_beats_terse_answer() {
        let evaluator = HeuristicEvaluator::new();
        let good = evaluator.evaluate(QUESTION, GOOD_ANSWER).unwrap();
        let terse = evaluator.evaluate(QUESTION, "Ja.").unwrap();

        assert!(good.overall > terse.overall);
        assert!(good.structure > terse.structure);
        assert!(good.completeness > terse.completeness);
        assert!(good.word_count > 50);
        assert!(good.sentence_count > 5);
    }

    #[test]
    fn test_overall_is_weighted_sum() {
        let evaluator = HeuristicEvaluator::new();
        let r = evaluator.report(QUESTION, GOOD_ANSWER);
        let expected = 0.25 * r.relevance
            + 0.20 * r.completeness
            + 0.15 * r.fluency
            + 0.15 * r.structure
            + 0.10 * r.coherence
            + 0.10 * r.readability
            + 0.05 * r.factual_consistency;
        // sub-scores are rounded before recombination here
        assert!((r.overall - expected).abs() < 0.005);
    }

    #[test]
    fn test_custom_weights() {
        let weights = Weights {
            relevance: 0.0,
            completeness: 0.0,
            fluency: 0.0,
            structure: 0.0,
            coherence: 0.0,
            readability: 0.0,
            factual: 1.0,
        };
        let evaluator = HeuristicEvaluator::new().with_weights(weights);
        let report = evaluator.evaluate("Frage", "Das ist immer so und nie anders.").unwrap();
        assert_eq!(report.overall, report.factual_consistency);
        assert_eq!(report.overall, 0.8);
    }

    #[test]
    fn test_empty_answer_rejected() {
        let evaluator = HeuristicEvaluator::new();
        assert!(matches!(
            evaluator.evaluate(QUESTION, "  \n"),
            Err(QualityError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_semantic_backend_is_used() {
        struct Constant;
        impl Embedder for Constant {
            fn name(&self) -> &str {
                "constant"
            }
            fn embed(&self, _text: &str) -> Result<Vec<f32>, QualityError> {
                Ok(vec![0.5, 0.5])
            }
        }

        let evaluator = HeuristicEvaluator::with_embedder(Box::new(Constant));
        let report = evaluator.evaluate("Frage", "Antwort ohne Bezug").unwrap();
        assert_eq!(report.relevance, 1.0);
        assert_eq!(evaluator.relevance_backend().name(), "constant");
    }

    #[test]
    fn test_detect_picks_working_embedder() {
        struct Constant;
        impl Embedder for Constant {
            fn name(&self) -> &str {
                "constant"
            }
            fn embed(&self, _text: &str) -> Result<Vec<f32>, QualityError> {
                Ok(vec![1.0])
            }
        }

        struct Offline;
        impl Embedder for Offline {
            fn name(&self) -> &str {
                "offline"
            }
            fn embed(&self, _text: &str) -> Result<Vec<f32>, QualityError> {
                Err(QualityError::Backend("model not loaded".into()))
            }
        }

        let detected = HeuristicEvaluator::detect(Some(Box::new(Constant)));
        assert_eq!(detected.relevance_backend().name(), "constant");

        let fallback = HeuristicEvaluator::detect(Some(Box::new(Offline)));
        assert_eq!(fallback.relevance_backend().name(), "keyword-overlap");

        let none = HeuristicEvaluator::detect(None);
        assert_eq!(none.relevance_backend().name(), "keyword-overlap");
    }
}
