//! Tests for the RequestExecutor

use super::*;
use crate::error::ErrorKind;
use crate::request::SamplingParams;
use crate::response::TIMEOUT_SENTINEL;
use crate::testing::{FailingEvaluator, FixedEvaluator, PanickingEvaluator, ScriptedClient, Step};
use crate::traits::QualityEvaluator;

use std::sync::Arc;

fn executor(client: Arc<ScriptedClient>, evaluator: Arc<dyn QualityEvaluator>) -> RequestExecutor {
    RequestExecutor::new(client, evaluator, "test-model", SamplingParams::default())
}

// ============================================================================
// measure
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_measure_success_is_scored_and_timed() {
    let client = Arc::new(ScriptedClient::new(Step::answer("Eine Antwort.", 42, 250)));
    let evaluator = Arc::new(FixedEvaluator::new(0.8));
    let exec = executor(client.clone(), evaluator.clone());

    let result = exec.measure("Frage?").await;

    assert_eq!(result.question, "Frage?");
    assert_eq!(result.answer, "Eine Antwort.");
    assert_eq!(result.completion_tokens, 42);
    assert!((result.elapsed_ms - 250.0).abs() < 1.0, "elapsed {}", result.elapsed_ms);
    assert_eq!(result.quality, 0.8);
    assert!(result.quality_detail.is_some());
    assert!(result.is_success());
    assert_eq!(evaluator.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_measure_timeout_records_sentinel_and_time() {
    let client = Arc::new(ScriptedClient::new(Step::timeout(5_000)));
    let evaluator = Arc::new(FixedEvaluator::new(0.8));
    let exec = executor(client, evaluator.clone());

    let result = exec.measure("Frage?").await;

    assert_eq!(result.answer, TIMEOUT_SENTINEL);
    assert_eq!(result.error, Some(ErrorKind::Timeout));
    assert_eq!(result.quality, 0.0);
    assert!(result.elapsed_ms >= 5_000.0);
    assert_eq!(evaluator.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_measure_server_error_is_tagged() {
    let client = Arc::new(ScriptedClient::new(Step::server_error(10)));
    let exec = executor(client, Arc::new(FixedEvaluator::new(0.8)));

    let result = exec.measure("Frage?").await;

    assert_eq!(result.error, Some(ErrorKind::Server));
    assert!(result.answer.starts_with("ERROR: "));
    assert!(result.answer.contains("500"));
    assert_eq!(result.completion_tokens, 0);
    assert!(!result.is_success());
}

#[tokio::test(start_paused = true)]
async fn test_measure_malformed_response_is_tagged() {
    let client = Arc::new(ScriptedClient::new(Step::Malformed));
    let exec = executor(client, Arc::new(FixedEvaluator::new(0.8)));

    let result = exec.measure("Frage?").await;
    assert_eq!(result.error, Some(ErrorKind::MalformedResponse));
}

#[tokio::test(start_paused = true)]
async fn test_empty_answer_is_not_scored() {
    let client = Arc::new(ScriptedClient::new(Step::answer("   ", 0, 10)));
    let evaluator = Arc::new(FixedEvaluator::new(0.8));
    let exec = executor(client, evaluator.clone());

    let result = exec.measure("Frage?").await;

    assert!(result.is_success());
    assert_eq!(result.quality, 0.0);
    assert!(result.quality_detail.is_none());
    assert_eq!(evaluator.calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_evaluator_error_degrades_to_zero() {
    let client = Arc::new(ScriptedClient::new(Step::answer("Antwort", 3, 10)));
    let exec = executor(client, Arc::new(FailingEvaluator));

    let result = exec.measure("Frage?").await;

    assert!(result.is_success());
    assert_eq!(result.quality, 0.0);
    assert!(result.quality_detail.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_evaluator_panic_degrades_to_zero() {
    let client = Arc::new(ScriptedClient::new(Step::answer("Antwort", 3, 10)));
    let exec = executor(client, Arc::new(PanickingEvaluator));

    let result = exec.measure("Frage?").await;

    assert!(result.is_success());
    assert_eq!(result.quality, 0.0);
    assert!(result.quality_detail.is_none());
}

// ============================================================================
// probe
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_probe_returns_latency_without_scoring() {
    let client = Arc::new(ScriptedClient::new(Step::answer("Antwort", 3, 1_200)));
    let evaluator = Arc::new(FixedEvaluator::new(0.8));
    let exec = executor(client.clone(), evaluator.clone());

    let elapsed = exec.probe("Frage?").await;

    assert!((elapsed - 1_200.0).abs() < 1.0, "elapsed {elapsed}");
    assert_eq!(evaluator.calls(), 0);
    assert_eq!(client.chat_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_probe_failure_still_reports_time() {
    let client = Arc::new(ScriptedClient::new(Step::server_error(300)));
    let exec = executor(client, Arc::new(FixedEvaluator::new(0.8)));

    let elapsed = exec.probe("Frage?").await;
    assert!(elapsed >= 300.0);
}
