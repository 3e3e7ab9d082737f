//! Request execution: send, time, score

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use tokio::time::Instant;

use crate::request::{ChatRequest, SamplingParams};
use crate::response::{is_error_answer, ChatCompletion, QualityReport, QuestionResult};
use crate::traits::{ChatClient, QualityEvaluator, VendorError};

/// Sends one question at a time and turns the outcome into a result
///
/// Cheap to share: the client and evaluator are held behind `Arc`.
pub struct RequestExecutor {
    /// Client bound to the run's endpoint
    client: Arc<dyn ChatClient>,

    /// Scores successful answers
    evaluator: Arc<dyn QualityEvaluator>,

    /// Model identifier sent with every request
    model: String,

    /// Fixed sampling parameters
    params: SamplingParams,
}

impl RequestExecutor {
    /// Create a new executor
    pub fn new(
        client: Arc<dyn ChatClient>,
        evaluator: Arc<dyn QualityEvaluator>,
        model: impl Into<String>,
        params: SamplingParams,
    ) -> Self {
        Self {
            client,
            evaluator,
            model: model.into(),
            params,
        }
    }

    /// Send a question and discard the answer, returning the latency in ms
    ///
    /// Used for the cold warmup request. Failures are logged and still
    /// report the time spent.
    pub async fn probe(&self, question: &str) -> f64 {
        let (outcome, elapsed_ms) = self.send_timed(question).await;

        match outcome {
            Ok(completion) => {
                tracing::info!(
                    elapsed_ms = format_args!("{elapsed_ms:.1}"),
                    tokens = completion.completion_tokens,
                    "Warmup request finished"
                );
            }
            Err(e) => {
                tracing::warn!(
                    elapsed_ms = format_args!("{elapsed_ms:.1}"),
                    error = %e,
                    "Warmup request failed"
                );
            }
        }

        elapsed_ms
    }

    /// Send a question and capture the full result
    pub async fn measure(&self, question: &str) -> QuestionResult {
        let (outcome, elapsed_ms) = self.send_timed(question).await;

        match outcome {
            Ok(completion) => {
                tracing::info!(
                    elapsed_ms = format_args!("{elapsed_ms:.1}"),
                    tokens = completion.completion_tokens,
                    "Question processed"
                );

                let result = QuestionResult::success(
                    question,
                    completion.content,
                    elapsed_ms,
                    completion.completion_tokens,
                );

                match self.score(question, &result.answer) {
                    Some(report) => result.with_quality(report),
                    None => result,
                }
            }
            Err(e) => {
                let kind = e.to_error_kind();
                if kind.is_timeout() {
                    tracing::error!(
                        elapsed_ms = format_args!("{elapsed_ms:.1}"),
                        "Timeout while processing question"
                    );
                } else {
                    tracing::error!(
                        error = %e,
                        kind = %kind,
                        "Error while processing question"
                    );
                }
                QuestionResult::failure(question, kind, &e, elapsed_ms)
            }
        }
    }

    /// Send one request and measure wall-clock time around the call only
    async fn send_timed(&self, question: &str) -> (Result<ChatCompletion, VendorError>, f64) {
        let request = ChatRequest::single_turn(&self.model, question, self.params);

        let start = Instant::now();
        let outcome = self.client.chat(&request).await;
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        (outcome, elapsed_ms)
    }

    /// Run the evaluator on a real answer; any failure means "not scored"
    fn score(&self, question: &str, answer: &str) -> Option<QualityReport> {
        if answer.trim().is_empty() || is_error_answer(answer) {
            return None;
        }

        let evaluator = &self.evaluator;
        match std::panic::catch_unwind(AssertUnwindSafe(|| evaluator.evaluate(question, answer))) {
            Ok(Ok(report)) => {
                tracing::debug!(
                    evaluator = evaluator.name(),
                    overall = report.overall,
                    "Answer scored"
                );
                Some(report)
            }
            Ok(Err(e)) => {
                tracing::warn!(evaluator = evaluator.name(), error = %e, "Quality evaluation failed");
                None
            }
            Err(_) => {
                tracing::warn!(evaluator = evaluator.name(), "Quality evaluator panicked");
                None
            }
        }
    }
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("vendor", &self.client.vendor_name())
            .field("evaluator", &self.evaluator.name())
            .field("model", &self.model)
            .field("params", &self.params)
            .finish()
    }
}
