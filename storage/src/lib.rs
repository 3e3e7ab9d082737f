//! Storage for run artifacts
//!
//! This crate provides the local filesystem implementation of the
//! `ArtifactStore` trait:
//!
//! - Deterministic file names per server and model
//! - Atomic, pretty-printed JSON writes
//! - Timestamped emergency dumps when the results directory is unusable
//! - Reading artifacts back for re-scoring

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod local;
pub mod naming;

pub use local::{read_artifact, write_json_atomic, JsonFileStore, DEFAULT_RESULTS_DIR};
pub use naming::{artifact_file_name, emergency_file_name, quality_file_paths, sanitize};
