//! The canonical audit record.

use crate::{EventData, EventType, RecordError, Snapshot};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity substituted when the client supplies none.
pub const ANONYMOUS_USER: &str = "anonymous";

/// One normalized interaction, as shipped to the collection endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireRecord", into = "WireRecord")]
pub struct AuditRecord {
    /// Opaque client-supplied identity.
    pub user_id: String,
    /// Location (path, query and fragment) at emission time.
    pub path: String,
    /// Client-side emission time.
    pub timestamp: DateTime<Utc>,
    /// Snapshot of the target element, if any.
    pub element_info: Option<Snapshot>,
    /// Event payload; determines the event type.
    pub data: EventData,
}

impl AuditRecord {
    /// Create a record stamped with the current time.
    pub fn new(
        user_id: impl Into<String>,
        path: impl Into<String>,
        data: impl Into<EventData>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            path: path.into(),
            timestamp: Utc::now(),
            element_info: None,
            data: data.into(),
        }
    }

    /// Attach an element snapshot.
    pub fn with_element(mut self, snapshot: Snapshot) -> Self {
        self.element_info = Some(snapshot);
        self
    }

    /// Override the emission time.
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// The record's event type.
    pub fn event_type(&self) -> EventType {
        self.data.event_type()
    }

    /// Serialize to a JSON value.
    pub fn to_json(&self) -> Result<serde_json::Value, RecordError> {
        serde_json::to_value(self).map_err(RecordError::Encode)
    }

    /// Decode a record from JSON text.
    pub fn from_json(json: &str) -> Result<Self, RecordError> {
        serde_json::from_str(json).map_err(RecordError::Decode)
    }
}

/// JSON form of [`AuditRecord`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireRecord {
    user_id: String,
    path: String,
    timestamp: DateTime<Utc>,
    event_type: EventType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    element_info: Option<Snapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    additional_data: Option<serde_json::Value>,
}

impl TryFrom<WireRecord> for AuditRecord {
    type Error = RecordError;

    fn try_from(wire: WireRecord) -> Result<Self, Self::Error> {
        let data = EventData::from_value(wire.event_type, wire.additional_data)
            .map_err(|source| RecordError::Payload {
                event_type: wire.event_type,
                source,
            })?;

        Ok(Self {
            user_id: wire.user_id,
            path: wire.path,
            timestamp: wire.timestamp,
            element_info: wire.element_info,
            data,
        })
    }
}

impl From<AuditRecord> for WireRecord {
    fn from(record: AuditRecord) -> Self {
        let event_type = record.data.event_type();
        // Payload structs only hold strings, numbers and JSON values.
        let additional_data = record
            .data
            .to_value()
            .ok()
            .filter(|value| !matches!(value, serde_json::Value::Object(map) if map.is_empty()));

        Self {
            user_id: record.user_id,
            path: record.path,
            timestamp: record.timestamp,
            event_type,
            element_info: record.element_info,
            additional_data,
        }
    }
}

/// A record as accepted by the collection endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedRecord {
    /// The client record.
    #[serde(flatten)]
    pub record: AuditRecord,
    /// Server-side receipt time.
    pub server_timestamp: DateTime<Utc>,
}

impl ReceivedRecord {
    /// Tag a record with the current receipt time.
    pub fn receive(record: AuditRecord) -> Self {
        Self {
            record,
            server_timestamp: Utc::now(),
        }
    }
}
