//! Destinations for accepted audit records.

mod console;
mod format;
mod memory;

pub use console::ConsoleSink;
pub use format::format_line;
pub use memory::MemorySink;

use crate::config::{SinkConfig, SinkKind};
use async_trait::async_trait;
use clicktrail_audit_types::ReceivedRecord;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while storing a record.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("sink write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Stores records accepted by the collection endpoint.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Store one record.
    async fn write(&self, record: &ReceivedRecord) -> Result<(), SinkError>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Build the sink described by `config`.
pub fn from_config(config: &SinkConfig) -> Arc<dyn AuditSink> {
    match config.kind {
        SinkKind::Console => Arc::new(ConsoleSink::stdout(config.pretty)),
    }
}
