//! Per-kind event payloads (`additionalData` on the wire).

use crate::EventType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Payload for a `route_change` record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteChangeData {
    /// Location before the navigation; absent for the initial page view.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_path: Option<String>,
}

/// Payload for a `click` record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ClickData {
    /// Pointer x coordinate (client space).
    pub x: f64,
    /// Pointer y coordinate (client space).
    pub y: f64,
    /// Pointer button index (0 = primary).
    pub button: i16,
}

/// Payload for a `form_submit` record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSubmitData {
    /// Names of the form's named fields, in document order.
    pub form_fields: Vec<String>,
    /// Field values; only present when form value logging is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_values: Option<BTreeMap<String, String>>,
    /// Form `action` attribute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_action: Option<String>,
    /// Form `method` attribute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_method: Option<String>,
}

/// Payload for an `input_change` record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputChangeData {
    /// Input type (`text`, `email`, `password`, `textarea`...).
    pub input_type: String,
    /// Length of the value at flush time, in characters.
    pub value_length: usize,
    /// Field `name` attribute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,
    /// Literal value; only present when input value logging is enabled and
    /// the field is not a password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Payload for a `custom` record.
///
/// The business payload is kept open; its keys sit next to
/// `customEventType` on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomData {
    /// Application-defined event name, e.g. `business_event_checkout`.
    pub custom_event_type: String,
    /// Arbitrary business payload.
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl CustomData {
    /// Create a custom payload. A `customEventType` key inside `fields` is
    /// shadowed by the explicit event type.
    pub fn new(
        custom_event_type: impl Into<String>,
        mut fields: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        fields.remove("customEventType");
        Self {
            custom_event_type: custom_event_type.into(),
            fields,
        }
    }

    /// Look up a business payload field.
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.fields.get(key)
    }
}

/// Event payload, one variant per [`EventType`].
#[derive(Debug, Clone, PartialEq)]
pub enum EventData {
    RouteChange(RouteChangeData),
    Click(ClickData),
    FormSubmit(FormSubmitData),
    InputChange(InputChangeData),
    Custom(CustomData),
}

impl EventData {
    /// The event type this payload belongs to.
    pub fn event_type(&self) -> EventType {
        match self {
            Self::RouteChange(_) => EventType::RouteChange,
            Self::Click(_) => EventType::Click,
            Self::FormSubmit(_) => EventType::FormSubmit,
            Self::InputChange(_) => EventType::InputChange,
            Self::Custom(_) => EventType::Custom,
        }
    }

    pub(crate) fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            Self::RouteChange(data) => serde_json::to_value(data),
            Self::Click(data) => serde_json::to_value(data),
            Self::FormSubmit(data) => serde_json::to_value(data),
            Self::InputChange(data) => serde_json::to_value(data),
            Self::Custom(data) => serde_json::to_value(data),
        }
    }

    /// Decode the payload that `event_type` requires. A missing payload is
    /// accepted for route changes only.
    pub(crate) fn from_value(
        event_type: EventType,
        value: Option<serde_json::Value>,
    ) -> Result<Self, serde_json::Error> {
        use serde::de::Error as _;

        let value = match (event_type, value) {
            (EventType::RouteChange, None | Some(serde_json::Value::Null)) => {
                return Ok(Self::RouteChange(RouteChangeData::default()))
            }
            (_, None | Some(serde_json::Value::Null)) => {
                return Err(serde_json::Error::custom(format!(
                    "additionalData is required for {event_type} records"
                )))
            }
            (_, Some(value)) => value,
        };

        Ok(match event_type {
            EventType::RouteChange => Self::RouteChange(serde_json::from_value(value)?),
            EventType::Click => Self::Click(serde_json::from_value(value)?),
            EventType::FormSubmit => Self::FormSubmit(serde_json::from_value(value)?),
            EventType::InputChange => Self::InputChange(serde_json::from_value(value)?),
            EventType::Custom => Self::Custom(serde_json::from_value(value)?),
        })
    }
}

impl From<RouteChangeData> for EventData {
    fn from(data: RouteChangeData) -> Self {
        Self::RouteChange(data)
    }
}

impl From<ClickData> for EventData {
    fn from(data: ClickData) -> Self {
        Self::Click(data)
    }
}

impl From<FormSubmitData> for EventData {
    fn from(data: FormSubmitData) -> Self {
        Self::FormSubmit(data)
    }
}

impl From<InputChangeData> for EventData {
    fn from(data: InputChangeData) -> Self {
        Self::InputChange(data)
    }
}

impl From<CustomData> for EventData {
    fn from(data: CustomData) -> Self {
        Self::Custom(data)
    }
}
