//! OpenAI-compatible chat client
//!
//! Works against any server exposing `/v1/models` and
//! `/v1/chat/completions` (Ollama, vLLM, SGLang, llama.cpp, LM Studio, ...).
//! Model metadata comes from Ollama's `/api/show` when the server has it.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use stresstest_core::{ChatClient, ChatCompletion, ChatRequest, ModelMetadata, VendorError};

use crate::config::{normalize_base_url, root_url, ClientConfig};

/// Pooled HTTP client bound to one OpenAI-compatible endpoint
#[derive(Debug, Clone)]
pub struct OpenAiCompatClient {
    client: Client,
    base_url: String,
    root_url: String,
    api_key: Option<String>,
    request_timeout: Duration,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    #[serde(default)]
    data: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    id: String,
}

#[derive(Debug, Deserialize)]
struct CompletionBody {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ShowResponse {
    #[serde(default)]
    details: Option<ShowDetails>,
}

#[derive(Debug, Deserialize)]
struct ShowDetails {
    parameter_size: Option<String>,
    quantization_level: Option<String>,
    family: Option<String>,
}

impl OpenAiCompatClient {
    /// Build a client; the connection pool lives as long as the client
    pub fn new(config: &ClientConfig) -> Result<Self, VendorError> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .pool_max_idle_per_host(config.max_idle_connections)
            .build()?;

        Ok(Self {
            client,
            base_url: normalize_base_url(&config.endpoint),
            root_url: root_url(&config.endpoint),
            api_key: config.api_key.clone(),
            request_timeout: config.request_timeout,
        })
    }

    fn models_url(&self) -> String {
        format!("{}/models", self.base_url)
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn show_url(&self) -> String {
        format!("{}/api/show", self.root_url)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }

    /// Send and map transport errors, keeping timeouts distinguishable
    async fn send(&self, builder: RequestBuilder) -> Result<Response, VendorError> {
        let response = self
            .authorize(builder)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        Err(VendorError::ServerError {
            status: status.as_u16(),
            message: truncate(&message, 300),
        })
    }

    /// Read the whole body; a body that stalls past the deadline is a timeout
    async fn body_text(&self, response: Response) -> Result<String, VendorError> {
        response.text().await.map_err(|e| self.transport_error(e))
    }

    fn transport_error(&self, e: reqwest::Error) -> VendorError {
        if e.is_timeout() {
            VendorError::Timeout(self.request_timeout)
        } else {
            VendorError::Http(e)
        }
    }
}

#[async_trait]
impl ChatClient for OpenAiCompatClient {
    fn vendor_name(&self) -> &str {
        "openai-compatible"
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn list_models(&self) -> Result<Vec<String>, VendorError> {
        let response = self.send(self.client.get(self.models_url())).await?;
        let body = self.body_text(response).await?;
        let list: ModelList = serde_json::from_str(&body)
            .map_err(|e| VendorError::MalformedResponse(format!("model list: {e}")))?;

        Ok(list.data.into_iter().map(|m| m.id).collect())
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatCompletion, VendorError> {
        let response = self
            .send(self.client.post(self.chat_url()).json(request))
            .await
            .map_err(|e| match e {
                VendorError::ServerError { status, .. }
                    if status == StatusCode::NOT_FOUND.as_u16() =>
                {
                    VendorError::ModelNotFound(request.model.clone())
                }
                other => other,
            })?;

        let body = self.body_text(response).await?;
        let parsed: CompletionBody = serde_json::from_str(&body)
            .map_err(|e| VendorError::MalformedResponse(e.to_string()))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| VendorError::MalformedResponse("response has no choices".into()))?;

        Ok(ChatCompletion {
            content: choice.message.content.unwrap_or_default(),
            completion_tokens: parsed.usage.map(|u| u.completion_tokens).unwrap_or(0),
            finish_reason: choice.finish_reason,
        })
    }

    async fn model_metadata(&self, model: &str) -> Result<ModelMetadata, VendorError> {
        let body = serde_json::json!({ "model": model, "name": model });
        let response = self.send(self.client.post(self.show_url()).json(&body)).await?;
        let text = self.body_text(response).await?;
        let show: ShowResponse = serde_json::from_str(&text)
            .map_err(|e| VendorError::MalformedResponse(format!("model details: {e}")))?;

        Ok(show
            .details
            .map(|d| ModelMetadata {
                parameter_size: d.parameter_size,
                quantization_level: d.quantization_level,
                family: d.family,
            })
            .unwrap_or_default())
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
