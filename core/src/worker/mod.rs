//! Worker module for executing single questions
//!
//! The [`RequestExecutor`] is the atomic unit of work of a run. It sends one
//! prompt, times the call, and packages the outcome. It offers two
//! operations that share the same send-and-time primitive:
//!
//! 1. [`RequestExecutor::probe`]: send, time, discard the answer (warmup)
//! 2. [`RequestExecutor::measure`]: send, time, score, return a
//!    [`QuestionResult`](crate::QuestionResult)
//!
//! Request failures never escape the executor. They become error-tagged
//! results carrying the matching answer sentinel.
//!
//! # Example
//!
//! ```ignore
//! use stresstest_core::worker::RequestExecutor;
//!
//! let executor = RequestExecutor::new(client, evaluator, "llama3.1:8b", params);
//! let cold_ms = executor.probe(&questions[0]).await;
//! let first = executor.measure(&questions[0]).await;
//! ```

mod executor;

pub use executor::RequestExecutor;

#[cfg(test)]
mod tests;
