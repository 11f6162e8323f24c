//! Record construction from payload plus ambient context.

use crate::TrackingContext;
use clicktrail_audit_types::{AuditRecord, EventData, Snapshot};
use clicktrail_dom::Document;

/// Builds records stamped with the identity, location and time at call time.
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    context: TrackingContext,
    document: Document,
}

impl RecordBuilder {
    /// Create a builder reading from `context` and `document`.
    pub fn new(context: TrackingContext, document: Document) -> Self {
        Self { context, document }
    }

    /// Build a record for `data`.
    pub fn build(&self, data: impl Into<EventData>, element_info: Option<Snapshot>) -> AuditRecord {
        let record = AuditRecord::new(self.context.user_id(), self.document.location(), data);
        match element_info {
            Some(snapshot) => record.with_element(snapshot),
            None => record,
        }
    }

    /// The identity source.
    pub fn context(&self) -> &TrackingContext {
        &self.context
    }
}
