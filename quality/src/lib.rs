//! Heuristic quality scoring of LLM answers
//!
//! [`HeuristicEvaluator`] implements the core `QualityEvaluator` seam. It
//! combines seven sub-scores, all in [0, 1]:
//!
//! | Score | Weight |
//! |-------|--------|
//! | relevance | 0.25 |
//! | completeness | 0.20 |
//! | fluency | 0.15 |
//! | structure | 0.15 |
//! | coherence | 0.10 |
//! | readability | 0.10 |
//! | factual consistency | 0.05 |
//!
//! Relevance is computed by a [`RelevanceBackend`]: cosine similarity of
//! embeddings when an [`Embedder`] is available, keyword overlap otherwise.
//! The lexical patterns target German answers.
//!
//! [`rescore_artifact`] scores a persisted run again and
//! [`dataset_report`] summarizes the scores of a result set.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod evaluator;
pub mod heuristics;
pub mod relevance;
pub mod report;
pub mod rescore;
pub mod text;

pub use evaluator::{HeuristicEvaluator, Weights};
pub use relevance::{cosine_similarity, keyword_relevance, Embedder, RelevanceBackend};
pub use report::{dataset_report, DatasetReport, MetricStats, QualityDistribution};
pub use rescore::{rescore_artifact, Rescored};
pub use text::TextStats;
