//! Question sources for llm-stresstest
//!
//! This crate provides implementations of the `QuestionSource` trait for:
//!
//! - JSON question files (`{"fragen": [...]}`, alias `questions`)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod file;

pub use file::{JsonQuestionFile, DEFAULT_QUESTIONS_KEY};
