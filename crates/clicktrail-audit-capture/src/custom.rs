//! Application-raised custom events.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error};

/// A custom event raised by application code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomEvent {
    /// Application-defined name, e.g. `business_event_checkout`.
    pub event_type: String,
    /// Selector of the element the event relates to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element_selector: Option<String>,
    /// Business payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<Map<String, Value>>,
}

impl CustomEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            element_selector: None,
            custom_data: None,
        }
    }

    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.element_selector = Some(selector.into());
        self
    }

    /// Replace the payload.
    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.custom_data = Some(data);
        self
    }

    /// Add one payload field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.custom_data
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }
}

type Subscriber = Arc<dyn Fn(&CustomEvent) + Send + Sync>;

/// Handle returned by [`CustomEventChannel::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct ChannelState {
    next_id: AtomicU64,
    subscribers: RwLock<Vec<(SubscriptionId, Subscriber)>>,
}

/// Publish/subscribe channel for custom events.
///
/// Each dispatcher owns its own channel; clones are emitter handles onto the
/// same subscriber list.
#[derive(Clone, Default)]
pub struct CustomEventChannel {
    state: Arc<ChannelState>,
}

impl CustomEventChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber.
    pub fn subscribe<F>(&self, subscriber: F) -> SubscriptionId
    where
        F: Fn(&CustomEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.state.next_id.fetch_add(1, Ordering::Relaxed));
        self.state.subscribers.write().push((id, Arc::new(subscriber)));
        id
    }

    /// Remove a subscriber. Returns whether it was registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.state.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|(sid, _)| *sid != id);
        subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.state.subscribers.read().len()
    }

    /// Deliver `event` to every subscriber; returns how many received it.
    pub fn emit(&self, event: CustomEvent) -> usize {
        let subscribers: Vec<Subscriber> = self
            .state
            .subscribers
            .read()
            .iter()
            .map(|(_, s)| Arc::clone(s))
            .collect();

        debug!(event_type = %event.event_type, subscribers = subscribers.len(), "Emitting custom event");
        for subscriber in &subscribers {
            if catch_unwind(AssertUnwindSafe(|| subscriber(&event))).is_err() {
                error!(event_type = %event.event_type, "Custom event subscriber panicked");
            }
        }
        subscribers.len()
    }

    /// Emit `business_event_<name>`.
    pub fn track_business_event(&self, name: &str, data: Map<String, Value>) -> usize {
        self.emit(CustomEvent::new(format!("business_event_{name}")).with_data(data))
    }

    /// Emit `user_action_<action>`, optionally tied to an element.
    pub fn track_user_action(
        &self,
        action: &str,
        selector: Option<&str>,
        data: Map<String, Value>,
    ) -> usize {
        let mut event = CustomEvent::new(format!("user_action_{action}")).with_data(data);
        if let Some(selector) = selector {
            event = event.with_selector(selector);
        }
        self.emit(event)
    }

    /// Emit `feature_usage_<feature>`.
    pub fn track_feature_usage(&self, feature: &str, data: Map<String, Value>) -> usize {
        self.emit(CustomEvent::new(format!("feature_usage_{feature}")).with_data(data))
    }
}

impl std::fmt::Debug for CustomEventChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CustomEventChannel")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Emit a custom event on a channel.
///
/// ```ignore
/// track!(channel, "business_event_checkout", order_id = "123", total = 42);
/// track!(channel, "user_action_share", selector = "#share-btn");
/// ```
#[macro_export]
macro_rules! track {
    ($channel:expr, $event_type:expr) => {
        $channel.emit($crate::CustomEvent::new($event_type))
    };
    ($channel:expr, $event_type:expr, selector = $selector:expr) => {
        $channel.emit($crate::CustomEvent::new($event_type).with_selector($selector))
    };
    ($channel:expr, $event_type:expr, $($key:ident = $value:expr),+ $(,)?) => {{
        let event = $crate::CustomEvent::new($event_type)
            $(.with_field(stringify!($key), $value))+;
        $channel.emit(event)
    }};
}
