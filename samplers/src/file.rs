//! JSON question file

use std::path::{Path, PathBuf};

use serde_json::Value;
use stresstest_core::{QuestionSource, SamplerError};

/// Key holding the question list
pub const DEFAULT_QUESTIONS_KEY: &str = "fragen";

/// Accepted alternative to [`DEFAULT_QUESTIONS_KEY`]
const ALIAS_KEY: &str = "questions";

/// Questions stored as a list of strings in a JSON object
///
/// ```json
/// { "fragen": ["Was ist Rust?", "Erkläre TCP."] }
/// ```
#[derive(Debug, Clone)]
pub struct JsonQuestionFile {
    path: PathBuf,
}

impl JsonQuestionFile {
    /// Source reading from `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File this source reads
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse the question list out of JSON text
    pub fn parse(content: &str) -> Result<Vec<String>, SamplerError> {
        let value: Value = serde_json::from_str(content)?;

        let list = value
            .get(DEFAULT_QUESTIONS_KEY)
            .or_else(|| value.get(ALIAS_KEY))
            .and_then(Value::as_array)
            .ok_or_else(|| SamplerError::MissingKey(DEFAULT_QUESTIONS_KEY.to_string()))?;

        list.iter()
            .enumerate()
            .map(|(index, item)| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or(SamplerError::InvalidEntry(index))
            })
            .collect()
    }
}

impl QuestionSource for JsonQuestionFile {
    fn name(&self) -> &str {
        "json-file"
    }

    fn load(&self, limit: usize) -> Result<Vec<String>, SamplerError> {
        let content = std::fs::read_to_string(&self.path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                SamplerError::NotFound(self.path.clone())
            } else {
                SamplerError::Io {
                    path: self.path.clone(),
                    source,
                }
            }
        })?;

        let mut questions = Self::parse(&content)?;
        if questions.is_empty() {
            return Err(SamplerError::Empty);
        }

        let available = questions.len();
        questions.truncate(limit);
        if questions.is_empty() {
            return Err(SamplerError::Empty);
        }

        tracing::info!(
            path = %self.path.display(),
            loaded = questions.len(),
            available,
            "Loaded questions"
        );
        Ok(questions)
    }
}
