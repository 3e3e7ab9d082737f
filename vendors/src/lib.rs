//! Chat client implementations for llm-stresstest
//!
//! This crate provides the implementation of the `ChatClient` trait for
//! servers speaking the OpenAI chat-completions protocol:
//!
//! - Ollama
//! - vLLM / SGLang
//! - llama.cpp server, LM Studio, and similar
//!
//! Ollama servers additionally report model details through `/api/show`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod openai;

pub use config::{normalize_base_url, root_url, ClientConfig};
pub use openai::OpenAiCompatClient;
