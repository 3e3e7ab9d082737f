//! Reduction of the result list into summary statistics

use crate::metrics::{round_to, RunAggregate};
use crate::response::QuestionResult;

/// Aggregate a frozen result list
///
/// Pure: the same input always yields the same aggregate. Runtime and token
/// figures use successful results only; quality figures use results with a
/// positive score only. Empty subsets produce zeros, never NaN.
pub fn aggregate_results(results: &[QuestionResult], load_time_ms: f64) -> RunAggregate {
    let successful: Vec<&QuestionResult> = results.iter().filter(|r| r.is_success()).collect();
    let runtimes: Vec<f64> = successful.iter().map(|r| r.elapsed_ms).collect();
    let tokens: Vec<u32> = successful.iter().map(|r| r.completion_tokens).collect();
    let qualities: Vec<f64> = results
        .iter()
        .map(|r| r.quality)
        .filter(|q| *q > 0.0)
        .collect();

    let runtime_sum: f64 = runtimes.iter().sum();
    let runtime_avg = mean(runtime_sum, runtimes.len());

    let token_sum: u64 = tokens.iter().map(|&t| u64::from(t)).sum();
    let token_avg = mean(token_sum as f64, tokens.len());

    let quality_sum: f64 = qualities.iter().sum();
    let quality_avg = mean(quality_sum, qualities.len());

    let llm_load_time = load_time_ms.max(0.0);
    let runtime_avg = round_to(runtime_avg, 1);
    let cold_start_factor = if llm_load_time > 0.0 && runtime_avg > 0.0 {
        round_to(llm_load_time / runtime_avg, 2)
    } else {
        0.0
    };

    RunAggregate {
        runtime_sum: round_to(runtime_sum, 1),
        runtime_avg,
        runtime_min: round_to(min_f64(&runtimes), 1),
        runtime_max: round_to(max_f64(&runtimes), 1),

        token_sum,
        token_avg: token_avg.round(),
        token_min: tokens.iter().copied().min().unwrap_or(0),
        token_max: tokens.iter().copied().max().unwrap_or(0),

        quality_sum: round_to(quality_sum, 3),
        quality_avg: round_to(quality_avg, 3),
        quality_min: round_to(min_f64(&qualities), 3),
        quality_max: round_to(max_f64(&qualities), 3),

        llm_load_time: round_to(llm_load_time, 1),
        cold_start_factor,

        total_requests: results.len(),
        successful_requests: successful.len(),
        failed_requests: results.iter().filter(|r| r.error.is_some()).count(),
        timeout_requests: results.iter().filter(|r| r.is_timeout()).count(),
    }
}

fn mean(sum: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

fn min_f64(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::min).unwrap_or(0.0)
}

fn max_f64(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::max).unwrap_or(0.0)
}
