//! Channel configuration for orchestrator progress reporting

/// Channel buffer configuration for orchestrator communication
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// Progress event buffer size (orchestrator -> UI)
    pub event_buffer: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self { event_buffer: 256 }
    }
}

impl ChannelConfig {
    /// Create a new channel config with custom event buffer size
    pub fn with_event_buffer(mut self, size: usize) -> Self {
        self.event_buffer = size.max(1);
        self
    }
}
