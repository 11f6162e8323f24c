//! Audit event kinds.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Kind of interaction an audit record describes.
///
/// The set is closed: the collection endpoint formats and routes records
/// by this value and rejects anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, EnumIter, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EventType {
    /// The location changed (including the initial page view).
    RouteChange,
    /// A pointer click on a trackable element.
    Click,
    /// A form was submitted.
    FormSubmit,
    /// A text-like input settled after a burst of edits.
    InputChange,
    /// An application-raised business event.
    Custom,
}

impl EventType {
    /// Get all event types.
    pub fn all() -> impl Iterator<Item = Self> {
        use strum::IntoEnumIterator;
        Self::iter()
    }

    /// Whether records of this kind normally carry an element snapshot.
    pub fn expects_element(&self) -> bool {
        matches!(self, Self::Click | Self::FormSubmit | Self::InputChange)
    }

    /// Short upper-case label used by console sinks.
    pub fn label(&self) -> &'static str {
        match self {
            Self::RouteChange => "ROUTE",
            Self::Click => "CLICK",
            Self::FormSubmit => "FORM",
            Self::InputChange => "INPUT",
            Self::Custom => "CUSTOM",
        }
    }
}
