//! In-memory document host for Clicktrail.
//!
//! Models just enough of a browser document for interaction capture:
//!
//! - An element tree with ids, classes, attributes, text and values
//! - Capture/bubble listener phases and target-level handlers
//! - A location with history subscriptions
//! - A small CSS selector subset for element lookup

mod document;
mod element;
mod event;
mod history;
mod selector;

pub use document::{Document, DomError};
pub use element::{Element, NodeId};
pub use event::{DomEvent, EventCategory, EventKind, Listener, ListenerId, Phase};
pub use history::{normalize_location, HistoryListener, HistoryListenerId, Navigation};
pub use selector::{Selector, SelectorError};
