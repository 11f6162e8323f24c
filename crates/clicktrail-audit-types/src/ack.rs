//! Collection endpoint acknowledgement.

use crate::EventType;
use serde::{Deserialize, Serialize};

/// Body returned by the collection endpoint for an accepted record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectAck {
    /// Whether the record was accepted.
    pub success: bool,
    /// Human-readable status.
    pub message: String,
    /// Event type of the accepted record.
    pub event_type: EventType,
}

impl CollectAck {
    /// Acknowledge a record of `event_type`.
    pub fn received(event_type: EventType) -> Self {
        Self {
            success: true,
            message: "Audit log received".to_string(),
            event_type,
        }
    }
}
