//! Shared handler state.

use crate::config::ServerConfig;
use crate::sink::{self, AuditSink};
use std::sync::Arc;

/// State shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    pub sink: Arc<dyn AuditSink>,
}

impl AppState {
    /// State with the sink described by `config`.
    pub fn new(config: &ServerConfig) -> Self {
        Self::with_sink(sink::from_config(&config.sink))
    }

    pub fn with_sink(sink: Arc<dyn AuditSink>) -> Self {
        Self { sink }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("sink", &self.sink.name())
            .finish()
    }
}
