//! Batch scheduling of the remaining questions

use futures::future::join_all;

use crate::response::QuestionResult;
use crate::worker::RequestExecutor;

/// Results of the batch phase
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchOutcome {
    /// Results in dispatch order
    pub results: Vec<QuestionResult>,
    /// Whether scheduling stopped early because of a timeout
    pub aborted_on_timeout: bool,
}

/// Drives questions in fixed-size batches
///
/// With concurrency 1 questions run strictly one after another. Otherwise
/// each chunk of `concurrency` questions is sent at once and awaited in full
/// before the next chunk starts, so at most `concurrency` requests are in
/// flight. All futures of a chunk are joined on the calling task.
#[derive(Debug)]
pub struct BatchScheduler<'a> {
    executor: &'a RequestExecutor,
    concurrency: usize,
}

impl<'a> BatchScheduler<'a> {
    /// Create a scheduler; a concurrency of 0 is treated as 1
    pub fn new(executor: &'a RequestExecutor, concurrency: usize) -> Self {
        Self {
            executor,
            concurrency: concurrency.max(1),
        }
    }

    /// Run all `questions`, calling `on_result` for every recorded result
    pub async fn run<F>(&self, questions: &[String], mut on_result: F) -> BatchOutcome
    where
        F: FnMut(&QuestionResult),
    {
        let mut outcome = BatchOutcome {
            results: Vec::with_capacity(questions.len()),
            aborted_on_timeout: false,
        };

        if self.concurrency == 1 {
            for (index, question) in questions.iter().enumerate() {
                tracing::debug!(index, "Sending question");
                let result = self.executor.measure(question).await;
                on_result(&result);
                let timed_out = result.is_timeout();
                outcome.results.push(result);

                if timed_out {
                    tracing::warn!(
                        completed = outcome.results.len(),
                        "Timeout detected, stopping sequential execution"
                    );
                    outcome.aborted_on_timeout = true;
                    break;
                }
            }
            return outcome;
        }

        let batch_count = questions.len().div_ceil(self.concurrency);
        for (batch_index, chunk) in questions.chunks(self.concurrency).enumerate() {
            tracing::info!(
                batch = batch_index + 1,
                batches = batch_count,
                size = chunk.len(),
                "Running batch"
            );

            let batch = join_all(chunk.iter().map(|q| self.executor.measure(q))).await;
            let timed_out = batch.iter().any(QuestionResult::is_timeout);

            for result in batch {
                on_result(&result);
                outcome.results.push(result);
            }

            if timed_out {
                tracing::warn!(
                    batch = batch_index + 1,
                    completed = outcome.results.len(),
                    "Timeout detected in batch, stopping further batches"
                );
                outcome.aborted_on_timeout = true;
                break;
            }
        }

        outcome
    }
}
