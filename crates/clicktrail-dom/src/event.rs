//! Interaction events and listener registration types.

use crate::Element;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Category a listener subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCategory {
    Click,
    Submit,
    Change,
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Click => "click",
            Self::Submit => "submit",
            Self::Change => "change",
        })
    }
}

/// Propagation phase of a document-level listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Runs before any target-level handler.
    Capture,
    /// Runs after target-level handlers, unless propagation was stopped.
    Bubble,
}

/// Event-specific details.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventKind {
    Click { x: f64, y: f64, button: i16 },
    Submit,
    Change,
}

impl EventKind {
    /// Listener category for this kind.
    pub fn category(&self) -> EventCategory {
        match self {
            Self::Click { .. } => EventCategory::Click,
            Self::Submit => EventCategory::Submit,
            Self::Change => EventCategory::Change,
        }
    }
}

/// An event being dispatched through a document.
#[derive(Debug)]
pub struct DomEvent {
    kind: EventKind,
    target: Element,
    propagation_stopped: AtomicBool,
}

impl DomEvent {
    pub(crate) fn new(kind: EventKind, target: Element) -> Self {
        Self {
            kind,
            target,
            propagation_stopped: AtomicBool::new(false),
        }
    }

    /// Event details.
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Listener category.
    pub fn category(&self) -> EventCategory {
        self.kind.category()
    }

    /// The target element as it was when the event was dispatched.
    pub fn target(&self) -> &Element {
        &self.target
    }

    /// Prevent the event from reaching further handlers.
    pub fn stop_propagation(&self) {
        self.propagation_stopped.store(true, Ordering::SeqCst);
    }

    /// Whether a handler stopped propagation.
    pub fn is_propagation_stopped(&self) -> bool {
        self.propagation_stopped.load(Ordering::SeqCst)
    }
}

/// Callback invoked for dispatched events.
pub type Listener = Arc<dyn Fn(&DomEvent) + Send + Sync>;

/// Handle returned by listener registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }
}
