//! Re-scoring of a persisted run artifact

use stresstest_core::{aggregate_results, is_error_answer, QualityEvaluator, RunArtifact};

/// Outcome of [`rescore_artifact`]
#[derive(Debug, Clone)]
pub struct Rescored {
    /// Artifact with fresh scores and quality aggregates
    pub artifact: RunArtifact,
    /// Results that got a new score
    pub evaluated: usize,
    /// Results left unscored (failure sentinel, empty question or answer)
    pub skipped: usize,
}

/// Score every answer of `artifact` again
///
/// Each scorable result gets a new `quality` and `quality_detail`; the
/// others keep their record with the score cleared. Only the `quality_*`
/// aggregate fields are recomputed, latency and token figures stay as
/// recorded.
pub fn rescore_artifact(evaluator: &dyn QualityEvaluator, mut artifact: RunArtifact) -> Rescored {
    let mut evaluated = 0;
    let mut skipped = 0;

    for (index, result) in artifact.results.iter_mut().enumerate() {
        let scorable = !result.question.trim().is_empty()
            && !result.answer.trim().is_empty()
            && !is_error_answer(&result.answer);

        let report = if scorable {
            evaluator
                .evaluate(&result.question, &result.answer)
                .map_err(|e| tracing::warn!(index, error = %e, "Evaluation failed"))
                .ok()
        } else {
            tracing::debug!(index, "Skipping result without a scorable answer");
            None
        };

        match report {
            Some(report) => {
                result.quality = report.overall;
                result.quality_detail = Some(report);
                evaluated += 1;
            }
            None => {
                result.quality = 0.0;
                result.quality_detail = None;
                skipped += 1;
            }
        }
    }

    let fresh = aggregate_results(&artifact.results, artifact.aggregate.llm_load_time);
    let aggregate = &mut artifact.aggregate;
    aggregate.quality_sum = fresh.quality_sum;
    aggregate.quality_avg = fresh.quality_avg;
    aggregate.quality_min = fresh.quality_min;
    aggregate.quality_max = fresh.quality_max;

    tracing::info!(evaluated, skipped, quality_avg = aggregate.quality_avg, "Re-scored artifact");

    Rescored {
        artifact,
        evaluated,
        skipped,
    }
}
