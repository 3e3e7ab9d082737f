//! Two-phase warmup of the first question

use crate::response::QuestionResult;
use crate::worker::RequestExecutor;

/// Result of warming up with the first question
#[derive(Debug, Clone, PartialEq)]
pub struct WarmupOutcome {
    /// Hot measurement; becomes the first entry of the result list
    pub result: QuestionResult,
    /// Cold request latency (ms)
    pub warmup_ms: f64,
    /// Hot request latency (ms)
    pub hot_ms: f64,
    /// `max(0, cold - hot)`, or 0 when the hot measurement failed
    pub load_time_ms: f64,
}

impl WarmupOutcome {
    /// Whether the hot measurement timed out, which stops the run
    pub fn timed_out(&self) -> bool {
        self.result.is_timeout()
    }
}

/// Probe the first question cold, then measure it hot
///
/// The cold answer is discarded; only the hot measurement is kept.
pub async fn warm_up(executor: &RequestExecutor, question: &str) -> WarmupOutcome {
    tracing::info!("Starting warmup with first question");
    let warmup_ms = executor.probe(question).await;

    tracing::info!("Measuring first question hot");
    let result = executor.measure(question).await;
    let hot_ms = result.elapsed_ms;

    let load_time_ms = if result.error.is_some() {
        0.0
    } else {
        (warmup_ms - hot_ms).max(0.0)
    };

    tracing::info!(
        warmup_ms = format_args!("{warmup_ms:.1}"),
        hot_ms = format_args!("{hot_ms:.1}"),
        load_time_ms = format_args!("{load_time_ms:.1}"),
        "Warmup finished"
    );

    WarmupOutcome {
        result,
        warmup_ms,
        hot_ms,
        load_time_ms,
    }
}
