//! Model registry updater
//!
//! Scans the `meta.model` of every result artifact and keeps
//! `config/models.json` up to date with what is known about each model:
//!
//! - Local Ollama tags (`/api/tags`)
//! - Hugging Face model API, with a search fallback
//! - Heuristics on the model name (parameter count, provider, type)
//!
//! Runs as a standalone job after each stress test and never touches the
//! result files themselves.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod heuristics;
pub mod model;
pub mod sources;
pub mod updater;

pub use error::{RegistryError, RegistryResult};
pub use model::{InfoQuality, ModelInfo, ModelRegistry, ModelType, RegistryStatistics, SizeCategory};
pub use sources::{HuggingFaceInfo, ModelSources, OllamaInfo, SourcesConfig};
pub use updater::{RegistryUpdater, UpdateSummary, DEFAULT_MODELS_FILE};
