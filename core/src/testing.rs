//! Test doubles shared by the worker and orchestrator tests

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::metrics::{ModelMetadata, RunArtifact};
use crate::request::ChatRequest;
use crate::response::{ChatCompletion, QualityReport};
use crate::traits::{
    ArtifactStore, ChatClient, HookError, HookOutcome, PostRunHook, QualityError,
    QualityEvaluator, StorageError, VendorError,
};

// ============================================================================
// Scripted ChatClient
// ============================================================================

/// What the scripted server does with one request
#[derive(Debug, Clone)]
pub enum Step {
    /// Answer after `delay`
    Answer {
        content: String,
        tokens: u32,
        delay: Duration,
    },
    /// Time out after `delay`
    Timeout { delay: Duration },
    /// Return a 500 after `delay`
    ServerError { delay: Duration },
    /// Return an unusable body
    Malformed,
}

impl Step {
    pub fn answer(content: &str, tokens: u32, delay_ms: u64) -> Self {
        Step::Answer {
            content: content.to_string(),
            tokens,
            delay: Duration::from_millis(delay_ms),
        }
    }

    pub fn timeout(delay_ms: u64) -> Self {
        Step::Timeout {
            delay: Duration::from_millis(delay_ms),
        }
    }

    pub fn server_error(delay_ms: u64) -> Self {
        Step::ServerError {
            delay: Duration::from_millis(delay_ms),
        }
    }
}

/// Chat client that replays per-question scripts
///
/// Each question has a queue of steps; once a queue is drained the default
/// step applies. Tracks call order and the peak number of in-flight calls.
pub struct ScriptedClient {
    scripts: Mutex<HashMap<String, VecDeque<Step>>>,
    default_step: Step,
    reachable: bool,
    metadata: Option<ModelMetadata>,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    list_calls: AtomicUsize,
}

impl ScriptedClient {
    pub fn new(default_step: Step) -> Self {
        Self {
            scripts: Mutex::new(HashMap::new()),
            default_step,
            reachable: true,
            metadata: None,
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            list_calls: AtomicUsize::new(0),
        }
    }

    /// Queue steps for one question
    pub fn script(self, question: &str, steps: Vec<Step>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(question.to_string(), steps.into());
        self
    }

    /// Make the connection test fail
    pub fn unreachable(mut self) -> Self {
        self.reachable = false;
        self
    }

    pub fn with_metadata(mut self, metadata: ModelMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Prompts in the order they were sent
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn chat_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    fn next_step(&self, question: &str) -> Step {
        self.scripts
            .lock()
            .unwrap()
            .get_mut(question)
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(|| self.default_step.clone())
    }
}

#[async_trait]
impl ChatClient for ScriptedClient {
    fn vendor_name(&self) -> &str {
        "scripted"
    }

    fn base_url(&self) -> &str {
        "http://scripted.test/v1"
    }

    async fn list_models(&self) -> Result<Vec<String>, VendorError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.reachable {
            Ok(vec!["test-model".to_string()])
        } else {
            Err(VendorError::ServerError {
                status: 502,
                message: "bad gateway".into(),
            })
        }
    }

    async fn chat(&self, request: &ChatRequest) -> Result<ChatCompletion, VendorError> {
        let question = request.prompt().to_string();
        self.calls.lock().unwrap().push(question.clone());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let outcome = match self.next_step(&question) {
            Step::Answer {
                content,
                tokens,
                delay,
            } => {
                tokio::time::sleep(delay).await;
                Ok(ChatCompletion::new(content, tokens))
            }
            Step::Timeout { delay } => {
                tokio::time::sleep(delay).await;
                Err(VendorError::Timeout(delay))
            }
            Step::ServerError { delay } => {
                tokio::time::sleep(delay).await;
                Err(VendorError::ServerError {
                    status: 500,
                    message: "internal error".into(),
                })
            }
            Step::Malformed => Err(VendorError::MalformedResponse("no choices".into())),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome
    }

    async fn model_metadata(&self, _model: &str) -> Result<ModelMetadata, VendorError> {
        self.metadata
            .clone()
            .ok_or_else(|| VendorError::ModelNotFound("no metadata".into()))
    }
}

// ============================================================================
// Evaluators
// ============================================================================

/// Scores every answer with a fixed value and counts invocations
pub struct FixedEvaluator {
    score: f64,
    calls: AtomicUsize,
}

impl FixedEvaluator {
    pub fn new(score: f64) -> Self {
        Self {
            score,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl QualityEvaluator for FixedEvaluator {
    fn name(&self) -> &str {
        "fixed"
    }

    fn evaluate(&self, _question: &str, _answer: &str) -> Result<QualityReport, QualityError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(QualityReport {
            overall: self.score,
            ..Default::default()
        })
    }
}

/// Evaluator that always errors
pub struct FailingEvaluator;

impl QualityEvaluator for FailingEvaluator {
    fn name(&self) -> &str {
        "failing"
    }

    fn evaluate(&self, _question: &str, _answer: &str) -> Result<QualityReport, QualityError> {
        Err(QualityError::Backend("model unavailable".into()))
    }
}

/// Evaluator that panics
pub struct PanickingEvaluator;

impl QualityEvaluator for PanickingEvaluator {
    fn name(&self) -> &str {
        "panicking"
    }

    fn evaluate(&self, _question: &str, _answer: &str) -> Result<QualityReport, QualityError> {
        panic!("evaluator bug")
    }
}

// ============================================================================
// In-memory ArtifactStore
// ============================================================================

/// Store that keeps artifacts in memory, optionally failing writes
#[derive(Default)]
pub struct MemoryStore {
    pub existing: Vec<PathBuf>,
    pub fail_primary: bool,
    pub fail_emergency: bool,
    pub persisted: Mutex<Vec<(PathBuf, RunArtifact)>>,
    pub emergency: Mutex<Vec<RunArtifact>>,
}

impl MemoryStore {
    pub fn last_persisted(&self) -> Option<RunArtifact> {
        self.persisted
            .lock()
            .unwrap()
            .last()
            .map(|(_, artifact)| artifact.clone())
    }
}

impl ArtifactStore for MemoryStore {
    fn artifact_path(&self, server: &str, model: &str) -> PathBuf {
        PathBuf::from(format!("results/result_{server}_{model}.json"))
    }

    fn exists(&self, path: &Path) -> bool {
        self.existing.iter().any(|p| p == path)
    }

    fn persist(&self, path: &Path, artifact: &RunArtifact) -> Result<PathBuf, StorageError> {
        if self.fail_primary {
            return Err(StorageError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            ));
        }
        self.persisted
            .lock()
            .unwrap()
            .push((path.to_path_buf(), artifact.clone()));
        Ok(path.to_path_buf())
    }

    fn emergency_dump(&self, artifact: &RunArtifact) -> Result<PathBuf, StorageError> {
        let path = PathBuf::from("emergency_results_test.json");
        if self.fail_emergency {
            return Err(StorageError::io(
                &path,
                std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
            ));
        }
        self.emergency.lock().unwrap().push(artifact.clone());
        Ok(path)
    }
}

// ============================================================================
// Hooks
// ============================================================================

/// Hook that sleeps, then reports `exit_code`
pub struct CountingHook {
    pub delay: Duration,
    pub exit_code: i32,
    pub runs: Arc<AtomicUsize>,
}

impl CountingHook {
    pub fn new(delay_ms: u64, exit_code: i32) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            exit_code,
            runs: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl PostRunHook for CountingHook {
    fn name(&self) -> &str {
        "counting"
    }

    async fn run(&self) -> Result<HookOutcome, HookError> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Ok(HookOutcome {
            exit_code: Some(self.exit_code),
            ..Default::default()
        })
    }
}
