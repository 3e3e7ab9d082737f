//! Registry update job

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::{RegistryError, RegistryResult};
use crate::heuristics::{
    assess_info_quality, determine_model_type, extract_parameters, extract_provider, size_category,
};
use crate::model::{timestamp, ModelInfo, ModelRegistry};
use crate::sources::{HuggingFaceInfo, ModelSources, OllamaInfo};

/// Default registry location
pub const DEFAULT_MODELS_FILE: &str = "config/models.json";

/// Outcome of one update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateSummary {
    /// Result files inspected
    pub scanned_files: usize,
    /// Distinct models found in them
    pub models_found: usize,
    /// Models added to the registry, sorted
    pub added: Vec<String>,
    /// Whether the registry file was written
    pub saved: bool,
}

/// Scans result artifacts and maintains the model registry file
#[derive(Debug)]
pub struct RegistryUpdater {
    results_dir: PathBuf,
    models_file: PathBuf,
    sources: ModelSources,
}

impl RegistryUpdater {
    /// Updater reading `results_dir` and maintaining `models_file`
    pub fn new(
        results_dir: impl Into<PathBuf>,
        models_file: impl Into<PathBuf>,
        sources: ModelSources,
    ) -> Self {
        Self {
            results_dir: results_dir.into(),
            models_file: models_file.into(),
            sources,
        }
    }

    /// Registry file location
    pub fn models_file(&self) -> &Path {
        &self.models_file
    }

    /// Collect `meta.model` of every `*.json` in the results directory
    ///
    /// Unreadable files are skipped with a warning. Returns the number of
    /// files looked at and the distinct model names.
    pub fn scan_result_files(&self) -> RegistryResult<(usize, BTreeSet<String>)> {
        let entries = match fs::read_dir(&self.results_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(dir = %self.results_dir.display(), "Results directory does not exist");
                return Ok((0, BTreeSet::new()));
            }
            Err(e) => return Err(RegistryError::io(&self.results_dir, e)),
        };

        let mut files: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "json"))
            .collect();
        files.sort();

        let mut models = BTreeSet::new();
        for path in &files {
            match read_model_name(path) {
                Ok(Some(model)) => {
                    tracing::debug!(file = %path.display(), model = %model, "Found model");
                    models.insert(model);
                }
                Ok(None) => {}
                Err(e) => tracing::warn!(error = %e, "Skipping unreadable result file"),
            }
        }

        tracing::info!(files = files.len(), models = models.len(), "Scanned result files");
        Ok((files.len(), models))
    }

    /// Load the registry, starting fresh when the file is missing or corrupt
    pub fn load_registry(&self) -> ModelRegistry {
        let content = match fs::read_to_string(&self.models_file) {
            Ok(content) => content,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %self.models_file.display(), error = %e, "Could not read registry");
                }
                return ModelRegistry::new();
            }
        };

        match serde_json::from_str::<ModelRegistry>(&content) {
            Ok(registry) => {
                tracing::info!(
                    path = %self.models_file.display(),
                    models = registry.models.len(),
                    "Loaded registry"
                );
                registry
            }
            Err(e) => {
                tracing::warn!(path = %self.models_file.display(), error = %e, "Registry is corrupt, starting fresh");
                ModelRegistry::new()
            }
        }
    }

    /// Gather everything the sources and name heuristics know about a model
    pub async fn collect_model_info(&self, model_name: &str) -> ModelInfo {
        let mut info = ModelInfo {
            name: model_name.to_string(),
            added_date: timestamp(),
            model_type: Some(determine_model_type(model_name, &[])),
            ..Default::default()
        };

        if let Some(ollama) = self.sources.ollama(model_name).await {
            apply_ollama(&mut info, ollama);
            tracing::debug!(model = model_name, "Ollama details found");
        }

        if let Some(hf) = self.sources.huggingface(model_name).await {
            merge_huggingface(&mut info, hf);
            tracing::debug!(model = model_name, "Hugging Face details found");
        }

        if info.parameters.is_none() {
            if let Some(parameters) = extract_parameters(model_name) {
                info.parameters = Some(parameters);
                info.parameter_estimate = true;
            }
        }

        if info.provider.is_none() {
            info.provider = Some(extract_provider(model_name));
        }

        if info.parameters.is_some() {
            info.size_category = Some(size_category(info.parameters));
        }

        info.info_quality = assess_info_quality(&info);
        tracing::info!(
            model = model_name,
            quality = ?info.info_quality,
            sources = ?info.sources,
            "Collected model info"
        );
        info
    }

    /// Write the registry as pretty JSON, creating its directory
    pub fn save_registry(&self, registry: &mut ModelRegistry) -> RegistryResult<()> {
        registry.last_updated = timestamp();

        if let Some(parent) = self.models_file.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| RegistryError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(registry)
            .map_err(|e| RegistryError::json(&self.models_file, e))?;
        fs::write(&self.models_file, json).map_err(|e| RegistryError::io(&self.models_file, e))?;

        let stats = &registry.statistics;
        tracing::info!(
            path = %self.models_file.display(),
            total = stats.total_models,
            full = stats.models_with_full_info,
            partial = stats.models_with_partial_info,
            without = stats.models_without_info,
            "Registry saved"
        );
        Ok(())
    }

    /// Scan, add unknown models, refresh statistics and save
    ///
    /// Nothing is written when no result file names a model.
    pub async fn run(&self) -> RegistryResult<UpdateSummary> {
        let (scanned_files, found) = self.scan_result_files()?;
        let mut summary = UpdateSummary {
            scanned_files,
            models_found: found.len(),
            ..Default::default()
        };

        if found.is_empty() {
            tracing::warn!(dir = %self.results_dir.display(), "No models found in result files");
            return Ok(summary);
        }

        let mut registry = self.load_registry();
        let missing: Vec<String> = found
            .into_iter()
            .filter(|model| !registry.models.contains_key(model))
            .collect();

        if missing.is_empty() {
            tracing::info!("All models already in registry");
        }
        for model in &missing {
            let info = self.collect_model_info(model).await;
            registry.models.insert(model.clone(), info);
        }

        registry.refresh_statistics();
        self.save_registry(&mut registry)?;

        summary.added = missing;
        summary.saved = true;
        Ok(summary)
    }
}

fn read_model_name(path: &Path) -> RegistryResult<Option<String>> {
    let content = fs::read_to_string(path).map_err(|e| RegistryError::io(path, e))?;
    let value: Value = serde_json::from_str(&content).map_err(|e| RegistryError::json(path, e))?;
    Ok(value
        .get("meta")
        .and_then(|meta| meta.get("model"))
        .and_then(Value::as_str)
        .map(str::to_string))
}

fn apply_ollama(info: &mut ModelInfo, ollama: OllamaInfo) {
    info.parameter_size = ollama.parameter_size;
    info.quantization_level = ollama.quantization_level;
    info.family = ollama.family;
    info.format = ollama.format;
    info.size_bytes = ollama.size_bytes;
    info.modified_at = ollama.modified_at;
    info.source = Some("ollama_local".into());
    info.sources.push("ollama_local".into());
}

/// Fill only what is still unknown
fn merge_huggingface(info: &mut ModelInfo, hf: HuggingFaceInfo) {
    fn fill<T>(slot: &mut Option<T>, value: Option<T>) {
        if slot.is_none() {
            *slot = value;
        }
    }

    fill(&mut info.provider, Some(hf.provider));
    fill(&mut info.license, hf.license);
    fill(&mut info.parameters, hf.parameters);
    fill(&mut info.architecture, hf.architecture);
    fill(&mut info.context_length, hf.context_length);
    fill(&mut info.multimodal, Some(hf.multimodal));
    fill(&mut info.tools_support, Some(hf.tools_support));
    fill(&mut info.reasoning_optimized, Some(hf.reasoning_optimized));
    fill(&mut info.source, Some("huggingface".into()));
    if info.tags.is_empty() {
        info.tags = hf.tags;
    }
    if !info.sources.iter().any(|s| s == "huggingface") {
        info.sources.push("huggingface".into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InfoQuality, ModelType, SizeCategory};
    use crate::sources::SourcesConfig;
    use serde_json::json;
    use std::time::Duration;
    use tempfile::TempDir;

    fn offline_sources() -> ModelSources {
        ModelSources::new(SourcesConfig {
            ollama_url: None,
            huggingface_url: None,
            huggingface_delay: Duration::ZERO,
            ..Default::default()
        })
        .unwrap()
    }

    fn write_result(dir: &Path, file: &str, model: &str) {
        let body = json!({"meta": {"model": model}, "results": [], "aggregate": {}});
        fs::write(dir.join(file), body.to_string()).unwrap();
    }

    fn updater(dir: &TempDir, sources: ModelSources) -> RegistryUpdater {
        RegistryUpdater::new(
            dir.path().join("results"),
            dir.path().join("config").join("models.json"),
            sources,
        )
    }

    #[test]
    fn test_scan_result_files() {
        let dir = TempDir::new().unwrap();
        let results = dir.path().join("results");
        fs::create_dir_all(&results).unwrap();
        write_result(&results, "result_a_qwen.json", "qwen2.5:7b");
        write_result(&results, "result_b_qwen.json", "qwen2.5:7b");
        write_result(&results, "result_c_llama.json", "llama3.1:8b");
        fs::write(results.join("broken.json"), "{not json").unwrap();
        fs::write(results.join("notes.txt"), "ignored").unwrap();
        fs::write(results.join("no_meta.json"), "{}").unwrap();

        let (files, models) = updater(&dir, offline_sources()).scan_result_files().unwrap();
        assert_eq!(files, 5);
        assert_eq!(
            models.into_iter().collect::<Vec<_>>(),
            vec!["llama3.1:8b".to_string(), "qwen2.5:7b".to_string()]
        );
    }

    #[test]
    fn test_missing_results_dir() {
        let dir = TempDir::new().unwrap();
        let (files, models) = updater(&dir, offline_sources()).scan_result_files().unwrap();
        assert_eq!(files, 0);
        assert!(models.is_empty());
    }

    #[test]
    fn test_load_corrupt_registry_starts_fresh() {
        let dir = TempDir::new().unwrap();
        let updater = updater(&dir, offline_sources());
        fs::create_dir_all(updater.models_file().parent().unwrap()).unwrap();
        fs::write(updater.models_file(), "[1, 2").unwrap();

        let registry = updater.load_registry();
        assert!(registry.models.is_empty());
        assert!(!registry.last_updated.is_empty());
    }

    #[tokio::test]
    async fn test_collect_from_name_only() {
        let dir = TempDir::new().unwrap();
        let info = updater(&dir, offline_sources())
            .collect_model_info("llama3.1:8b-instruct")
            .await;

        assert_eq!(info.model_type, Some(ModelType::Instruct));
        assert_eq!(info.parameters, Some(8_000_000_000));
        assert!(info.parameter_estimate);
        assert_eq!(info.provider.as_deref(), Some("unknown"));
        assert_eq!(info.size_category, Some(SizeCategory::Medium));
        assert_eq!(info.info_quality, InfoQuality::Partial);
        assert!(info.sources.is_empty());
    }

    #[tokio::test]
    async fn test_run_adds_only_new_models() {
        let dir = TempDir::new().unwrap();
        let results = dir.path().join("results");
        fs::create_dir_all(&results).unwrap();
        write_result(&results, "result_a.json", "qwen2.5:7b");
        write_result(&results, "result_b.json", "mistral");

        let updater = updater(&dir, offline_sources());
        let mut existing = ModelRegistry::new();
        existing.models.insert(
            "mistral".into(),
            ModelInfo {
                name: "mistral".into(),
                provider: Some("mistral".into()),
                ..Default::default()
            },
        );
        updater.save_registry(&mut existing).unwrap();

        let summary = updater.run().await.unwrap();
        assert_eq!(summary.scanned_files, 2);
        assert_eq!(summary.models_found, 2);
        assert_eq!(summary.added, vec!["qwen2.5:7b".to_string()]);
        assert!(summary.saved);

        let saved: ModelRegistry =
            serde_json::from_str(&fs::read_to_string(updater.models_file()).unwrap()).unwrap();
        assert_eq!(saved.models.len(), 2);
        assert_eq!(saved.models["mistral"].provider.as_deref(), Some("mistral"));
        assert_eq!(saved.statistics.total_models, 2);
        assert_eq!(saved.statistics.by_provider["mistral"], 1);
    }

    #[tokio::test]
    async fn test_run_without_models_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let updater = updater(&dir, offline_sources());

        let summary = updater.run().await.unwrap();
        assert!(!summary.saved);
        assert!(!updater.models_file().exists());
    }

    #[tokio::test]
    async fn test_collect_merges_sources() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/tags")
            .with_status(200)
            .with_body(
                json!({"models": [{
                    "name": "qwen2.5:7b",
                    "details": {"parameter_size": "7.6B", "family": "qwen2"}
                }]})
                .to_string(),
            )
            .create_async()
            .await;
        server
            .mock("GET", "/api/models/qwen2.5-7b")
            .with_status(200)
            .with_body(
                json!({
                    "id": "Qwen/Qwen2.5-7B",
                    "license": "apache-2.0",
                    "config": {"model_type": "qwen2", "max_position_embeddings": 32768}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let sources = ModelSources::new(SourcesConfig {
            ollama_url: Some(server.url()),
            huggingface_url: Some(server.url()),
            huggingface_delay: Duration::ZERO,
            ..Default::default()
        })
        .unwrap();
        let dir = TempDir::new().unwrap();
        let info = updater(&dir, sources).collect_model_info("qwen2.5:7b").await;

        assert_eq!(info.sources, vec!["ollama_local", "huggingface"]);
        assert_eq!(info.source.as_deref(), Some("ollama_local"));
        assert_eq!(info.parameter_size.as_deref(), Some("7.6B"));
        assert_eq!(info.provider.as_deref(), Some("alibaba"));
        assert_eq!(info.parameters, Some(7_000_000_000));
        assert!(!info.parameter_estimate);
        assert_eq!(info.info_quality, InfoQuality::Complete);
    }
}
