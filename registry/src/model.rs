//! `models.json` document

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Local timestamp in ISO 8601 with microseconds
pub fn timestamp() -> String {
    chrono::Local::now()
        .format("%Y-%m-%dT%H:%M:%S%.6f")
        .to_string()
}

/// Whole registry file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelRegistry {
    /// Last save time
    #[serde(default)]
    pub last_updated: String,

    /// Model entries keyed by model name
    #[serde(default)]
    pub models: BTreeMap<String, ModelInfo>,

    /// Derived counters, rebuilt on every update
    #[serde(default)]
    pub statistics: RegistryStatistics,
}

impl ModelRegistry {
    /// Empty registry stamped with the current time
    pub fn new() -> Self {
        Self {
            last_updated: timestamp(),
            ..Default::default()
        }
    }

    /// Rebuild [`RegistryStatistics`] from the model entries
    pub fn refresh_statistics(&mut self) {
        let mut stats = RegistryStatistics {
            total_models: self.models.len(),
            ..Default::default()
        };

        for info in self.models.values() {
            match info.info_quality {
                InfoQuality::Complete | InfoQuality::Good => stats.models_with_full_info += 1,
                InfoQuality::Partial => stats.models_with_partial_info += 1,
                InfoQuality::Minimal => stats.models_without_info += 1,
            }

            let provider = info.provider.clone().unwrap_or_else(|| "unknown".into());
            *stats.by_provider.entry(provider).or_default() += 1;

            let size = info.size_category.unwrap_or(SizeCategory::Unknown);
            *stats.by_size_category.entry(size.as_str().into()).or_default() += 1;

            let model_type = info.model_type.map_or("unknown", ModelType::as_str);
            *stats.by_model_type.entry(model_type.into()).or_default() += 1;
        }

        self.statistics = stats;
    }
}

/// Counters over all registry entries
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryStatistics {
    /// Number of entries
    pub total_models: usize,
    /// Entries rated complete or good
    pub models_with_full_info: usize,
    /// Entries rated partial
    pub models_with_partial_info: usize,
    /// Entries rated minimal
    pub models_without_info: usize,
    /// Entries per provider
    #[serde(default)]
    pub by_provider: BTreeMap<String, usize>,
    /// Entries per size category
    #[serde(default)]
    pub by_size_category: BTreeMap<String, usize>,
    /// Entries per model type
    #[serde(default)]
    pub by_model_type: BTreeMap<String, usize>,
}

/// What is known about one model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model name as it appears in the artifacts
    pub name: String,

    /// When the entry was created
    #[serde(default)]
    pub added_date: String,

    /// Inferred from the name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_type: Option<ModelType>,

    /// Sources that contributed, in lookup order
    #[serde(default)]
    pub sources: Vec<String>,

    /// Ollama parameter size label, e.g. `7.6B`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter_size: Option<String>,

    /// Ollama quantization, e.g. `Q4_K_M`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantization_level: Option<String>,

    /// Model family
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,

    /// Weight file format
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Size on disk
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,

    /// Last modification reported by Ollama
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_at: Option<String>,

    /// First source that provided details
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Publishing organisation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    /// License identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,

    /// Up to ten Hugging Face tags
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// Parameter count
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<u64>,

    /// Parameter count was guessed from the name
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub parameter_estimate: bool,

    /// Architecture (`model_type` of the HF config)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,

    /// Maximum context length
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_length: Option<u64>,

    /// Accepts images
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multimodal: Option<bool>,

    /// Supports function calling
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools_support: Option<bool>,

    /// Tuned for reasoning
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_optimized: Option<bool>,

    /// Bucket of `parameters`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_category: Option<SizeCategory>,

    /// How much of the entry is filled
    #[serde(default)]
    pub info_quality: InfoQuality,

    /// Fields written by other tools
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Rough model purpose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    /// Instruction tuned
    Instruct,
    /// Chat tuned
    Chat,
    /// Code model
    Code,
    /// Base model
    Base,
    /// Reasoning model
    Reasoning,
}

impl ModelType {
    /// Serialized name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Instruct => "instruct",
            Self::Chat => "chat",
            Self::Code => "code",
            Self::Base => "base",
            Self::Reasoning => "reasoning",
        }
    }
}

/// Parameter count bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeCategory {
    /// Below 1B
    Tiny,
    /// 1B to 3B
    Small,
    /// 3B to 10B
    Medium,
    /// 10B to 30B
    Large,
    /// 30B to 100B
    Xlarge,
    /// 100B and above
    Xxlarge,
    /// No parameter count
    Unknown,
}

impl SizeCategory {
    /// Serialized name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tiny => "tiny",
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
            Self::Xlarge => "xlarge",
            Self::Xxlarge => "xxlarge",
            Self::Unknown => "unknown",
        }
    }
}

/// Completeness rating of an entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfoQuality {
    /// All required and at least two optional fields
    Complete,
    /// All required fields
    Good,
    /// Two required fields
    Partial,
    /// Less than that
    #[default]
    Minimal,
}
