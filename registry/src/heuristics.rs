//! Facts derived from model names alone

use std::sync::OnceLock;

use regex::Regex;

use crate::model::{InfoQuality, ModelInfo, ModelType, SizeCategory};

const BILLION: f64 = 1_000_000_000.0;

fn parameter_patterns() -> &'static [(Regex, f64)] {
    static PATTERNS: OnceLock<Vec<(Regex, f64)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            (r"(\d+\.?\d*)\s*b(?:illion)?", BILLION),
            (r"(\d+\.?\d*)\s*m(?:illion)?", 1_000_000.0),
            (r"(\d+\.?\d*)\s*k", 1_000.0),
            (r"(\d+\.?\d*)\s*t(?:rillion)?", 1_000.0 * BILLION),
        ]
        .into_iter()
        .map(|(re, scale)| (Regex::new(re).expect("built-in pattern must compile"), scale))
        .collect()
    })
}

/// Parameter count from text such as `qwen2.5:7b` or `Phi-3-mini-128k`
///
/// Suffixes are tried in the order B, M, K, T; the first hit wins.
pub fn extract_parameters(text: &str) -> Option<u64> {
    let lower = text.to_lowercase();
    parameter_patterns().iter().find_map(|(re, scale)| {
        let number: f64 = re.captures(&lower)?.get(1)?.as_str().parse().ok()?;
        Some((number * scale) as u64)
    })
}

/// Provider from a `org/model` id
pub fn extract_provider(model_id: &str) -> String {
    let Some((org, _)) = model_id.split_once('/') else {
        return "unknown".into();
    };
    let org = org.to_lowercase();
    let provider = match org.as_str() {
        "meta-llama" => "meta",
        "mistralai" | "mistral" => "mistral",
        "alibaba" | "qwen" => "alibaba",
        other => other,
    };
    provider.to_string()
}

/// Purpose guessed from the name and optional tags
pub fn determine_model_type(model_name: &str, tags: &[String]) -> ModelType {
    let name = model_name.to_lowercase();
    let has_tag = |tag: &str| tags.iter().any(|t| t.eq_ignore_ascii_case(tag));

    if name.contains("instruct") || has_tag("instruct") {
        ModelType::Instruct
    } else if name.contains("chat") || has_tag("chat") {
        ModelType::Chat
    } else if name.contains("code") || has_tag("coding") {
        ModelType::Code
    } else if name.contains("base") || has_tag("foundation") {
        ModelType::Base
    } else if ["reasoning", "thinking", "r1"].iter().any(|w| name.contains(w)) {
        ModelType::Reasoning
    } else {
        ModelType::Chat
    }
}

/// Bucket a parameter count
pub fn size_category(parameters: Option<u64>) -> SizeCategory {
    const B: u64 = 1_000_000_000;
    match parameters {
        None | Some(0) => SizeCategory::Unknown,
        Some(p) if p < B => SizeCategory::Tiny,
        Some(p) if p < 3 * B => SizeCategory::Small,
        Some(p) if p < 10 * B => SizeCategory::Medium,
        Some(p) if p < 30 * B => SizeCategory::Large,
        Some(p) if p < 100 * B => SizeCategory::Xlarge,
        Some(_) => SizeCategory::Xxlarge,
    }
}

fn known(value: Option<&str>) -> bool {
    value.is_some_and(|v| v != "unknown")
}

/// Rate how complete an entry is
///
/// Required: parameters, provider, model type. Optional: context length,
/// architecture, license.
pub fn assess_info_quality(info: &ModelInfo) -> InfoQuality {
    let required = [
        info.parameters.is_some(),
        known(info.provider.as_deref()),
        info.model_type.is_some(),
    ]
    .into_iter()
    .filter(|&present| present)
    .count();

    let optional = [
        info.context_length.is_some(),
        known(info.architecture.as_deref()),
        known(info.license.as_deref()),
    ]
    .into_iter()
    .filter(|&present| present)
    .count();

    match (required, optional) {
        (3, o) if o >= 2 => InfoQuality::Complete,
        (3, _) => InfoQuality::Good,
        (2, _) => InfoQuality::Partial,
        _ => InfoQuality::Minimal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_parameters() {
        assert_eq!(extract_parameters("qwen2.5:7b"), Some(7_000_000_000));
        assert_eq!(extract_parameters("Qwen/Qwen2.5-0.5B-Instruct"), Some(500_000_000));
        assert_eq!(extract_parameters("llama3.1:70b-instruct"), Some(70_000_000_000));
        assert_eq!(extract_parameters("smollm:135m"), Some(135_000_000));
        assert_eq!(extract_parameters("mistral"), None);
    }

    #[test]
    fn test_extract_parameters_prefers_billion_suffix() {
        // 128k context in the name, but the 3.8b wins
        assert_eq!(extract_parameters("phi3:3.8b-mini-128k"), Some(3_800_000_000));
    }

    #[test]
    fn test_extract_provider() {
        assert_eq!(extract_provider("meta-llama/Llama-3.1-8B"), "meta");
        assert_eq!(extract_provider("Qwen/Qwen2.5-7B"), "alibaba");
        assert_eq!(extract_provider("mistralai/Mistral-7B"), "mistral");
        assert_eq!(extract_provider("TheBloke/foo"), "thebloke");
        assert_eq!(extract_provider("llama3:8b"), "unknown");
    }

    #[test]
    fn test_determine_model_type() {
        assert_eq!(determine_model_type("llama3.1:8b-instruct", &[]), ModelType::Instruct);
        assert_eq!(determine_model_type("qwen2.5-coder:7b", &[]), ModelType::Code);
        assert_eq!(determine_model_type("deepseek-r1:14b", &[]), ModelType::Reasoning);
        assert_eq!(determine_model_type("llama3", &["chat".into()]), ModelType::Chat);
        assert_eq!(determine_model_type("mistral", &[]), ModelType::Chat);
    }

    #[test]
    fn test_size_category() {
        assert_eq!(size_category(None), SizeCategory::Unknown);
        assert_eq!(size_category(Some(500_000_000)), SizeCategory::Tiny);
        assert_eq!(size_category(Some(1_000_000_000)), SizeCategory::Small);
        assert_eq!(size_category(Some(7_000_000_000)), SizeCategory::Medium);
        assert_eq!(size_category(Some(14_000_000_000)), SizeCategory::Large);
        assert_eq!(size_category(Some(70_000_000_000)), SizeCategory::Xlarge);
        assert_eq!(size_category(Some(405_000_000_000)), SizeCategory::Xxlarge);
    }

    #[test]
    fn test_assess_info_quality() {
        let mut info = ModelInfo {
            model_type: Some(ModelType::Chat),
            provider: Some("unknown".into()),
            ..Default::default()
        };
        assert_eq!(assess_info_quality(&info), InfoQuality::Minimal);

        info.parameters = Some(7_000_000_000);
        assert_eq!(assess_info_quality(&info), InfoQuality::Partial);

        info.provider = Some("meta".into());
        assert_eq!(assess_info_quality(&info), InfoQuality::Good);

        info.license = Some("llama3".into());
        info.context_length = Some(8192);
        assert_eq!(assess_info_quality(&info), InfoQuality::Complete);
    }
}
