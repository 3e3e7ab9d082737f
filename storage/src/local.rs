//! Local filesystem store

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use stresstest_core::{ArtifactStore, RunArtifact, StorageError};

use crate::naming::{artifact_file_name, emergency_file_name};

/// Default results directory
pub const DEFAULT_RESULTS_DIR: &str = "results";

/// Writes artifacts as pretty-printed JSON files
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    results_dir: PathBuf,
    emergency_dir: PathBuf,
}

impl Default for JsonFileStore {
    fn default() -> Self {
        Self::new(DEFAULT_RESULTS_DIR)
    }
}

impl JsonFileStore {
    /// Store writing into `results_dir`, emergency dumps into the working directory
    pub fn new(results_dir: impl Into<PathBuf>) -> Self {
        Self {
            results_dir: results_dir.into(),
            emergency_dir: PathBuf::from("."),
        }
    }

    /// Set the directory for emergency dumps
    pub fn with_emergency_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.emergency_dir = dir.into();
        self
    }

    /// Results directory
    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }
}

/// Serialize `value` as pretty JSON and write it through a temporary sibling file
///
/// Missing parent directories are created. Readers never see a partially
/// written file.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StorageError> {
    let json = serde_json::to_vec_pretty(value)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp = PathBuf::from(tmp_name);

    let written = fs::File::create(&tmp)
        .and_then(|mut file| {
            file.write_all(&json)?;
            file.write_all(b"\n")?;
            file.sync_all()
        })
        .map_err(|e| StorageError::io(&tmp, e));
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }

    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        StorageError::io(path, e)
    })
}

/// Load a persisted artifact
pub fn read_artifact(path: &Path) -> Result<RunArtifact, StorageError> {
    let content = fs::read_to_string(path).map_err(|e| StorageError::io(path, e))?;
    Ok(serde_json::from_str(&content)?)
}

impl ArtifactStore for JsonFileStore {
    fn artifact_path(&self, server: &str, model: &str) -> PathBuf {
        self.results_dir.join(artifact_file_name(server, model))
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn persist(&self, path: &Path, artifact: &RunArtifact) -> Result<PathBuf, StorageError> {
        write_json_atomic(path, artifact)?;
        tracing::info!(
            path = %path.display(),
            results = artifact.results.len(),
            "Results saved"
        );
        Ok(path.to_path_buf())
    }

    fn emergency_dump(&self, artifact: &RunArtifact) -> Result<PathBuf, StorageError> {
        let path = self
            .emergency_dir
            .join(emergency_file_name(chrono::Local::now()));
        write_json_atomic(&path, artifact)?;
        Ok(path)
    }
}
