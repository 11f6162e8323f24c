//! Record encoding errors.

use crate::EventType;

/// Errors raised while encoding or decoding audit records.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("failed to encode audit record: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("failed to decode audit record: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("additionalData does not match {event_type}: {source}")]
    Payload {
        event_type: EventType,
        #[source]
        source: serde_json::Error,
    },
}
