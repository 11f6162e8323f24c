use super::{AuditSink, SinkError};
use async_trait::async_trait;
use clicktrail_audit_types::ReceivedRecord;
use parking_lot::Mutex;
use std::sync::Arc;

/// In-memory sink, shareable across clones.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<ReceivedRecord>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of everything stored so far.
    pub fn records(&self) -> Vec<ReceivedRecord> {
        self.records.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

#[async_trait]
impl AuditSink for MemorySink {
    async fn write(&self, record: &ReceivedRecord) -> Result<(), SinkError> {
        self.records.lock().push(record.clone());
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
