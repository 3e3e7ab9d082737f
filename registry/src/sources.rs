//! Remote model information
//!
//! Lookups are best effort: transport errors and unexpected payloads are
//! logged and reported as "nothing found".

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;

use crate::error::RegistryResult;
use crate::heuristics::{extract_parameters, extract_provider};

/// Default local Ollama endpoint
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Default Hugging Face endpoint
pub const DEFAULT_HUGGINGFACE_URL: &str = "https://huggingface.co";

const USER_AGENT: &str = "LLM-Stresstest-ModelRegistry/1.0";

/// Where and how to look models up
#[derive(Debug, Clone)]
pub struct SourcesConfig {
    /// Ollama base URL, `None` disables the lookup
    pub ollama_url: Option<String>,
    /// Hugging Face base URL, `None` disables the lookup
    pub huggingface_url: Option<String>,
    /// Timeout of Ollama requests
    pub ollama_timeout: Duration,
    /// Timeout of Hugging Face requests
    pub huggingface_timeout: Duration,
    /// Pause before each Hugging Face lookup
    pub huggingface_delay: Duration,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            ollama_url: Some(DEFAULT_OLLAMA_URL.into()),
            huggingface_url: Some(DEFAULT_HUGGINGFACE_URL.into()),
            ollama_timeout: Duration::from_secs(5),
            huggingface_timeout: Duration::from_secs(10),
            huggingface_delay: Duration::from_millis(500),
        }
    }
}

/// Details from the local Ollama tag list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OllamaInfo {
    /// e.g. `7.6B`
    pub parameter_size: Option<String>,
    /// e.g. `Q4_K_M`
    pub quantization_level: Option<String>,
    /// Model family
    pub family: Option<String>,
    /// Weight format
    pub format: Option<String>,
    /// Size on disk
    pub size_bytes: Option<u64>,
    /// Modification time
    pub modified_at: Option<String>,
}

/// Details from the Hugging Face API
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HuggingFaceInfo {
    /// Resolved model id
    pub id: String,
    /// Organisation derived from the id
    pub provider: String,
    /// License tag
    pub license: Option<String>,
    /// First ten tags
    pub tags: Vec<String>,
    /// Parameter count from the id
    pub parameters: Option<u64>,
    /// Architecture from the model config
    pub architecture: Option<String>,
    /// Context length from the model config
    pub context_length: Option<u64>,
    /// Vision or multimodal tag present
    pub multimodal: bool,
    /// Tool calling tag present
    pub tools_support: bool,
    /// Reasoning keyword in the id
    pub reasoning_optimized: bool,
}

#[derive(Debug, Deserialize)]
struct TagList {
    #[serde(default)]
    models: Vec<Tag>,
}

#[derive(Debug, Deserialize)]
struct Tag {
    #[serde(default)]
    name: String,
    #[serde(default)]
    size: Option<u64>,
    #[serde(default)]
    modified_at: Option<String>,
    #[serde(default)]
    details: TagDetails,
}

#[derive(Debug, Default, Deserialize)]
struct TagDetails {
    parameter_size: Option<String>,
    quantization_level: Option<String>,
    family: Option<String>,
    format: Option<String>,
}

impl HuggingFaceInfo {
    /// Interpret a model document of the Hugging Face API
    pub fn from_api(data: &Value) -> Self {
        let id = data.get("id").and_then(Value::as_str).unwrap_or_default().to_string();
        let tags: Vec<String> = data
            .get("tags")
            .and_then(Value::as_array)
            .map(|tags| tags.iter().filter_map(Value::as_str).map(str::to_string).collect())
            .unwrap_or_default();
        let has_tag = |wanted: &[&str]| tags.iter().any(|t| wanted.contains(&t.as_str()));

        let license = data
            .get("license")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| {
                tags.iter()
                    .find_map(|t| t.strip_prefix("license:"))
                    .map(str::to_string)
            });

        let config = data.get("config");
        let architecture = config
            .and_then(|c| c.get("model_type"))
            .and_then(Value::as_str)
            .map(str::to_string);
        let context_length = config
            .and_then(|c| c.get("max_position_embeddings"))
            .and_then(Value::as_u64);

        let id_lower = id.to_lowercase();
        Self {
            provider: extract_provider(&id),
            parameters: extract_parameters(&id),
            license,
            architecture,
            context_length,
            multimodal: has_tag(&["vision", "multimodal", "image-text"]),
            tools_support: has_tag(&["function-calling", "tools"]),
            reasoning_optimized: ["reasoning", "thinking", "r1"].iter().any(|w| id_lower.contains(w)),
            tags: tags.iter().take(10).cloned().collect(),
            id,
        }
    }
}

/// Name used for Hugging Face lookups
fn huggingface_query(model_name: &str) -> String {
    model_name.replace([':', '_'], "-")
}

/// HTTP lookups against Ollama and Hugging Face
#[derive(Debug, Clone)]
pub struct ModelSources {
    http: Client,
    config: SourcesConfig,
}

impl ModelSources {
    /// Build the shared HTTP client
    pub fn new(config: SourcesConfig) -> RegistryResult<Self> {
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { http, config })
    }

    /// Source configuration
    pub fn config(&self) -> &SourcesConfig {
        &self.config
    }

    /// Look the model up in the local Ollama tag list
    pub async fn ollama(&self, model_name: &str) -> Option<OllamaInfo> {
        let base = self.config.ollama_url.as_deref()?;
        match self.fetch_ollama(base, model_name).await {
            Ok(info) => info,
            Err(e) => {
                tracing::debug!(model = model_name, error = %e, "Ollama lookup failed");
                None
            }
        }
    }

    async fn fetch_ollama(&self, base: &str, model_name: &str) -> RegistryResult<Option<OllamaInfo>> {
        let url = format!("{}/api/tags", base.trim_end_matches('/'));
        let response = self
            .http
            .get(&url)
            .timeout(self.config.ollama_timeout)
            .send()
            .await?;
        if response.status() != StatusCode::OK {
            return Ok(None);
        }

        let tags: TagList = response.json().await?;
        Ok(tags
            .models
            .into_iter()
            .find(|tag| tag.name == model_name)
            .map(|tag| OllamaInfo {
                parameter_size: tag.details.parameter_size,
                quantization_level: tag.details.quantization_level,
                family: tag.details.family,
                format: tag.details.format,
                size_bytes: tag.size,
                modified_at: tag.modified_at,
            }))
    }

    /// Look the model up on Hugging Face, by id first, then by search
    pub async fn huggingface(&self, model_name: &str) -> Option<HuggingFaceInfo> {
        let base = self.config.huggingface_url.as_deref()?;
        if !self.config.huggingface_delay.is_zero() {
            tokio::time::sleep(self.config.huggingface_delay).await;
        }
        match self.fetch_huggingface(base, model_name).await {
            Ok(info) => info,
            Err(e) => {
                tracing::warn!(model = model_name, error = %e, "Hugging Face lookup failed");
                None
            }
        }
    }

    async fn fetch_huggingface(
        &self,
        base: &str,
        model_name: &str,
    ) -> RegistryResult<Option<HuggingFaceInfo>> {
        let base = base.trim_end_matches('/');
        let query = huggingface_query(model_name);

        let response = self
            .http
            .get(format!("{base}/api/models/{query}"))
            .timeout(self.config.huggingface_timeout)
            .send()
            .await?;
        if response.status() == StatusCode::OK {
            let data: Value = response.json().await?;
            return Ok(Some(HuggingFaceInfo::from_api(&data)));
        }

        let response = self
            .http
            .get(format!("{base}/api/models"))
            .query(&[("search", query.as_str()), ("limit", "5")])
            .timeout(self.config.huggingface_timeout)
            .send()
            .await?;
        if response.status() != StatusCode::OK {
            return Ok(None);
        }

        let hits: Vec<Value> = response.json().await?;
        Ok(hits.first().map(HuggingFaceInfo::from_api))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    fn sources(ollama: Option<String>, hf: Option<String>) -> ModelSources {
        ModelSources::new(SourcesConfig {
            ollama_url: ollama,
            huggingface_url: hf,
            huggingface_delay: Duration::ZERO,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_huggingface_query() {
        assert_eq!(huggingface_query("qwen2.5:7b_q4"), "qwen2.5-7b-q4");
    }

    #[test]
    fn test_from_api() {
        let data = json!({
            "id": "meta-llama/Llama-3.1-8B-Instruct",
            "tags": ["transformers", "function-calling", "license:llama3.1"],
            "config": {"model_type": "llama", "max_position_embeddings": 131072}
        });
        let info = HuggingFaceInfo::from_api(&data);
        assert_eq!(info.provider, "meta");
        assert_eq!(info.parameters, Some(8_000_000_000));
        assert_eq!(info.license.as_deref(), Some("llama3.1"));
        assert_eq!(info.architecture.as_deref(), Some("llama"));
        assert_eq!(info.context_length, Some(131072));
        assert!(info.tools_support);
        assert!(!info.multimodal);
        assert!(!info.reasoning_optimized);
    }

    #[tokio::test]
    async fn test_ollama_lookup() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/tags")
            .with_status(200)
            .with_body(
                json!({"models": [
                    {"name": "other:1b", "details": {}},
                    {
                        "name": "qwen2.5:7b",
                        "size": 4683087332u64,
                        "modified_at": "2024-10-01T10:00:00Z",
                        "details": {
                            "parameter_size": "7.6B",
                            "quantization_level": "Q4_K_M",
                            "family": "qwen2",
                            "format": "gguf"
                        }
                    }
                ]})
                .to_string(),
            )
            .expect(2)
            .create_async()
            .await;

        let sources = sources(Some(server.url()), None);
        let info = sources.ollama("qwen2.5:7b").await.unwrap();
        assert_eq!(info.parameter_size.as_deref(), Some("7.6B"));
        assert_eq!(info.quantization_level.as_deref(), Some("Q4_K_M"));
        assert_eq!(info.size_bytes, Some(4683087332));
        assert!(sources.ollama("missing:1b").await.is_none());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_ollama_unreachable() {
        let sources = sources(Some("http://127.0.0.1:9".into()), None);
        assert!(sources.ollama("qwen2.5:7b").await.is_none());
    }

    #[tokio::test]
    async fn test_huggingface_direct_hit() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/models/Qwen/Qwen2.5-7B")
            .with_status(200)
            .with_body(json!({"id": "Qwen/Qwen2.5-7B", "tags": ["vision"]}).to_string())
            .create_async()
            .await;

        let info = sources(None, Some(server.url()))
            .huggingface("Qwen/Qwen2.5-7B")
            .await
            .unwrap();
        assert_eq!(info.provider, "alibaba");
        assert!(info.multimodal);
    }

    #[tokio::test]
    async fn test_huggingface_search_fallback() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/models/deepseek-r1-14b")
            .with_status(404)
            .create_async()
            .await;
        let search = server
            .mock("GET", "/api/models")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("search".into(), "deepseek-r1-14b".into()),
                Matcher::UrlEncoded("limit".into(), "5".into()),
            ]))
            .with_status(200)
            .with_body(json!([{"id": "deepseek-ai/DeepSeek-R1-Distill-Qwen-14B"}]).to_string())
            .create_async()
            .await;

        let info = sources(None, Some(server.url()))
            .huggingface("deepseek-r1:14b")
            .await
            .unwrap();
        assert_eq!(info.provider, "deepseek-ai");
        assert_eq!(info.parameters, Some(14_000_000_000));
        assert!(info.reasoning_optimized);
        search.assert_async().await;
    }

    #[tokio::test]
    async fn test_huggingface_nothing_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/models/unheard-of")
            .with_status(404)
            .create_async()
            .await;
        server
            .mock("GET", "/api/models")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let sources = sources(None, Some(server.url()));
        assert!(sources.huggingface("unheard_of").await.is_none());
    }

    #[tokio::test]
    async fn test_disabled_sources() {
        let sources = sources(None, None);
        assert!(sources.ollama("a").await.is_none());
        assert!(sources.huggingface("a").await.is_none());
    }
}
