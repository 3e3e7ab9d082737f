//! Builder pattern for Orchestrator construction

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::channel::ChannelConfig;
use crate::config::RunConfig;
use crate::error::{StressError, StressResult};
use crate::events::RunEvent;
use crate::traits::{ArtifactStore, ChatClient, PostRunHook, QualityEvaluator};
use crate::worker::RequestExecutor;

use super::executor::Orchestrator;
use super::hook::DEFAULT_HOOK_TIMEOUT;

/// Builder for creating an Orchestrator with proper configuration
///
/// # Example
///
/// ```ignore
/// let (orchestrator, events_rx) = OrchestratorBuilder::new(config)
///     .client(client)
///     .evaluator(evaluator)
///     .store(store)
///     .post_hook(hook)
///     .build()?;
/// ```
pub struct OrchestratorBuilder {
    config: RunConfig,
    client: Option<Arc<dyn ChatClient>>,
    evaluator: Option<Arc<dyn QualityEvaluator>>,
    store: Option<Arc<dyn ArtifactStore>>,
    hook: Option<Arc<dyn PostRunHook>>,
    hook_timeout: Duration,
    channel_config: ChannelConfig,
}

impl OrchestratorBuilder {
    /// Create a builder for one run of `config`
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            client: None,
            evaluator: None,
            store: None,
            hook: None,
            hook_timeout: DEFAULT_HOOK_TIMEOUT,
            channel_config: ChannelConfig::default(),
        }
    }

    /// Set the chat client
    pub fn client(mut self, client: Arc<dyn ChatClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the quality evaluator
    pub fn evaluator(mut self, evaluator: Arc<dyn QualityEvaluator>) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    /// Set the artifact store
    pub fn store(mut self, store: Arc<dyn ArtifactStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the post-run hook (optional)
    pub fn post_hook(mut self, hook: Arc<dyn PostRunHook>) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Bound the post-run hook
    pub fn hook_timeout(mut self, timeout: Duration) -> Self {
        self.hook_timeout = timeout;
        self
    }

    /// Set the channel configuration
    pub fn channel_config(mut self, config: ChannelConfig) -> Self {
        self.channel_config = config;
        self
    }

    /// Build the orchestrator and return it along with the event receiver
    ///
    /// # Errors
    ///
    /// Returns an error if client, evaluator or store are not set, or if
    /// configuration validation fails.
    pub fn build(self) -> StressResult<(Orchestrator, mpsc::Receiver<RunEvent>)> {
        let client = self
            .client
            .ok_or_else(|| StressError::missing_component("client"))?;

        let evaluator = self
            .evaluator
            .ok_or_else(|| StressError::missing_component("evaluator"))?;

        let store = self
            .store
            .ok_or_else(|| StressError::missing_component("store"))?;

        self.config.validate()?;

        let (events_tx, events_rx) = mpsc::channel(self.channel_config.event_buffer);

        let executor = RequestExecutor::new(
            Arc::clone(&client),
            evaluator,
            self.config.model.clone(),
            self.config.sampling_params(),
        );

        let orchestrator = Orchestrator {
            config: self.config,
            client,
            executor,
            store,
            hook: self.hook,
            hook_timeout: self.hook_timeout,
            events: events_tx,
        };

        Ok((orchestrator, events_rx))
    }
}
