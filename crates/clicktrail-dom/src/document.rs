//! The shared document: element tree, listeners and location.

use crate::event::{DomEvent, EventCategory, EventKind, Listener, ListenerId, Phase};
use crate::history::{normalize_location, HistoryListener, HistoryListenerId, Navigation};
use crate::selector::{Selector, SelectorError};
use crate::{Element, NodeId};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error};

/// Document errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("invalid selector: {0}")]
    Selector(#[from] SelectorError),
}

struct Node {
    element: Element,
    parent: Option<NodeId>,
}

struct RegisteredListener {
    id: ListenerId,
    category: EventCategory,
    phase: Phase,
    listener: Listener,
}

struct RegisteredHandler {
    id: ListenerId,
    node: NodeId,
    category: EventCategory,
    listener: Listener,
}

struct DocumentState {
    next_node: u64,
    next_listener: u64,
    nodes: BTreeMap<NodeId, Node>,
    location: String,
    listeners: Vec<RegisteredListener>,
    handlers: Vec<RegisteredHandler>,
    history_listeners: Vec<(HistoryListenerId, HistoryListener)>,
}

impl DocumentState {
    fn next_listener_id(&mut self) -> u64 {
        self.next_listener += 1;
        self.next_listener
    }

    fn snapshot(&self, node: NodeId) -> Option<Element> {
        self.nodes.get(&node).map(|n| n.element.clone())
    }

    /// Ancestor ids, nearest first.
    fn ancestors(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.nodes.get(&node).and_then(|n| n.parent);
        while let Some(id) = current {
            out.push(id);
            current = self.nodes.get(&id).and_then(|n| n.parent);
        }
        out
    }

    fn is_descendant_of(&self, node: NodeId, ancestor: NodeId) -> bool {
        self.ancestors(node).contains(&ancestor)
    }
}

/// In-memory document host.
///
/// Cloning yields another handle to the same document. Listener bodies are
/// invoked without any internal lock held, so they may freely query the
/// document.
#[derive(Clone)]
pub struct Document {
    state: Arc<RwLock<DocumentState>>,
}

impl Document {
    /// Create an empty document at `location`.
    pub fn new(location: impl AsRef<str>) -> Self {
        Self {
            state: Arc::new(RwLock::new(DocumentState {
                next_node: 0,
                next_listener: 0,
                nodes: BTreeMap::new(),
                location: normalize_location(location.as_ref()),
                listeners: Vec::new(),
                handlers: Vec::new(),
                history_listeners: Vec::new(),
            })),
        }
    }

    // ---- tree ----

    /// Insert a top-level element.
    pub fn append(&self, element: Element) -> NodeId {
        self.insert(None, element)
    }

    /// Insert an element under `parent`.
    pub fn append_child(&self, parent: NodeId, element: Element) -> Result<NodeId, DomError> {
        if !self.contains(parent) {
            return Err(DomError::UnknownNode(parent));
        }
        Ok(self.insert(Some(parent), element))
    }

    fn insert(&self, parent: Option<NodeId>, mut element: Element) -> NodeId {
        let mut state = self.state.write();
        state.next_node += 1;
        let id = NodeId::new(state.next_node);
        element.set_node_id(id);
        state.nodes.insert(id, Node { element, parent });
        id
    }

    /// Detach an element and its descendants. Returns the removed element.
    pub fn remove(&self, node: NodeId) -> Option<Element> {
        let mut state = self.state.write();
        let doomed: Vec<NodeId> = state
            .nodes
            .keys()
            .copied()
            .filter(|id| *id == node || state.is_descendant_of(*id, node))
            .collect();

        let removed = state.nodes.remove(&node).map(|n| n.element);
        for id in &doomed {
            state.nodes.remove(id);
        }
        state.handlers.retain(|h| !doomed.contains(&h.node));
        removed
    }

    /// Check whether `node` is attached.
    pub fn contains(&self, node: NodeId) -> bool {
        self.state.read().nodes.contains_key(&node)
    }

    /// Current state of an attached element.
    pub fn element(&self, node: NodeId) -> Option<Element> {
        self.state.read().snapshot(node)
    }

    /// Parent of an attached element.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.state.read().nodes.get(&node).and_then(|n| n.parent)
    }

    /// Replace the text content of an element.
    pub fn set_text(&self, node: NodeId, text: Option<String>) -> Result<(), DomError> {
        let mut state = self.state.write();
        let entry = state.nodes.get_mut(&node).ok_or(DomError::UnknownNode(node))?;
        entry.element.set_text(text);
        Ok(())
    }

    /// Named form controls under `form`, in document order.
    pub fn form_fields(&self, form: NodeId) -> Vec<Element> {
        let state = self.state.read();
        state
            .nodes
            .iter()
            .filter(|(id, node)| {
                node.element.is_form_control()
                    && node.element.name().is_some()
                    && state.is_descendant_of(**id, form)
            })
            .map(|(_, node)| node.element.clone())
            .collect()
    }

    /// First element, in document order, matching `selector`.
    pub fn query_selector(&self, selector: &str) -> Result<Option<Element>, DomError> {
        Ok(self.query_selector_all(selector)?.into_iter().next())
    }

    /// Every element matching `selector`, in document order.
    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<Element>, DomError> {
        let selector = Selector::parse(selector)?;
        let state = self.state.read();

        Ok(state
            .nodes
            .iter()
            .filter(|(id, node)| {
                let ancestors: Vec<&Element> = if selector.has_ancestors() {
                    state
                        .ancestors(**id)
                        .iter()
                        .filter_map(|a| state.nodes.get(a).map(|n| &n.element))
                        .collect()
                } else {
                    Vec::new()
                };
                selector.matches(&node.element, ancestors)
            })
            .map(|(_, node)| node.element.clone())
            .collect())
    }

    // ---- listeners ----

    /// Register a document-level listener.
    pub fn add_listener<F>(&self, category: EventCategory, phase: Phase, listener: F) -> ListenerId
    where
        F: Fn(&DomEvent) + Send + Sync + 'static,
    {
        let mut state = self.state.write();
        let id = ListenerId::new(state.next_listener_id());
        state.listeners.push(RegisteredListener {
            id,
            category,
            phase,
            listener: Arc::new(listener),
        });
        id
    }

    /// Register a target-level handler on `node`. Handlers run for events
    /// targeting the node or any of its descendants.
    pub fn add_handler<F>(
        &self,
        node: NodeId,
        category: EventCategory,
        listener: F,
    ) -> Result<ListenerId, DomError>
    where
        F: Fn(&DomEvent) + Send + Sync + 'static,
    {
        let mut state = self.state.write();
        if !state.nodes.contains_key(&node) {
            return Err(DomError::UnknownNode(node));
        }
        let id = ListenerId::new(state.next_listener_id());
        state.handlers.push(RegisteredHandler {
            id,
            node,
            category,
            listener: Arc::new(listener),
        });
        Ok(id)
    }

    /// Remove a listener or handler. Returns whether it was registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut state = self.state.write();
        let before = state.listeners.len() + state.handlers.len();
        state.listeners.retain(|l| l.id != id);
        state.handlers.retain(|h| h.id != id);
        before != state.listeners.len() + state.handlers.len()
    }

    /// Number of document-level listeners for `category`.
    pub fn listener_count(&self, category: EventCategory) -> usize {
        self.state
            .read()
            .listeners
            .iter()
            .filter(|l| l.category == category)
            .count()
    }

    /// Dispatch an event at `target`: capture listeners, then target
    /// handlers (innermost first), then bubble listeners.
    pub fn dispatch(&self, target: NodeId, kind: EventKind) -> Result<(), DomError> {
        let category = kind.category();

        let (element, capture, handlers, bubble) = {
            let state = self.state.read();
            let element = state.snapshot(target).ok_or(DomError::UnknownNode(target))?;

            let phase_listeners = |phase: Phase| -> Vec<Listener> {
                state
                    .listeners
                    .iter()
                    .filter(|l| l.category == category && l.phase == phase)
                    .map(|l| l.listener.clone())
                    .collect()
            };

            let mut path = vec![target];
            path.extend(state.ancestors(target));
            let handlers: Vec<Listener> = path
                .iter()
                .flat_map(|node| {
                    state
                        .handlers
                        .iter()
                        .filter(move |h| h.node == *node && h.category == category)
                        .map(|h| h.listener.clone())
                })
                .collect();

            (element, phase_listeners(Phase::Capture), handlers, phase_listeners(Phase::Bubble))
        };

        debug!(node = %target, category = %category, "dispatching event");
        let event = DomEvent::new(kind, element);

        for listener in &capture {
            invoke(category, || listener(&event));
        }
        for listener in handlers.iter().chain(bubble.iter()) {
            if event.is_propagation_stopped() {
                break;
            }
            invoke(category, || listener(&event));
        }
        Ok(())
    }

    /// Dispatch a click at `target`.
    pub fn click(&self, target: NodeId, x: f64, y: f64, button: i16) -> Result<(), DomError> {
        self.dispatch(target, EventKind::Click { x, y, button })
    }

    /// Dispatch a submit at `form`.
    pub fn submit(&self, form: NodeId) -> Result<(), DomError> {
        self.dispatch(form, EventKind::Submit)
    }

    /// Update the value of a control and dispatch a change event.
    pub fn set_value(&self, node: NodeId, value: impl Into<String>) -> Result<(), DomError> {
        {
            let mut state = self.state.write();
            let entry = state.nodes.get_mut(&node).ok_or(DomError::UnknownNode(node))?;
            entry.element.set_value(value.into());
        }
        self.dispatch(node, EventKind::Change)
    }

    // ---- location ----

    /// Current location (path, query and fragment).
    pub fn location(&self) -> String {
        self.state.read().location.clone()
    }

    /// Navigate to `location`. Returns `false` when the location is
    /// unchanged, in which case no history listener runs.
    pub fn navigate(&self, location: impl AsRef<str>) -> bool {
        let to = normalize_location(location.as_ref());

        let (navigation, listeners) = {
            let mut state = self.state.write();
            if state.location == to {
                return false;
            }
            let from = std::mem::replace(&mut state.location, to.clone());
            let listeners: Vec<HistoryListener> =
                state.history_listeners.iter().map(|(_, l)| l.clone()).collect();
            (Navigation { from, to }, listeners)
        };

        debug!(from = %navigation.from, to = %navigation.to, "navigated");
        for listener in &listeners {
            if catch_unwind(AssertUnwindSafe(|| listener(&navigation))).is_err() {
                error!(to = %navigation.to, "history listener panicked");
            }
        }
        true
    }

    /// Subscribe to location changes.
    pub fn listen_history<F>(&self, listener: F) -> HistoryListenerId
    where
        F: Fn(&Navigation) + Send + Sync + 'static,
    {
        let mut state = self.state.write();
        let id = HistoryListenerId::new(state.next_listener_id());
        state.history_listeners.push((id, Arc::new(listener)));
        id
    }

    /// Cancel a history subscription.
    pub fn unlisten_history(&self, id: HistoryListenerId) -> bool {
        let mut state = self.state.write();
        let before = state.history_listeners.len();
        state.history_listeners.retain(|(existing, _)| *existing != id);
        before != state.history_listeners.len()
    }

    /// Number of history subscriptions.
    pub fn history_listener_count(&self) -> usize {
        self.state.read().history_listeners.len()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("/")
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("Document")
            .field("location", &state.location)
            .field("nodes", &state.nodes.len())
            .field("listeners", &state.listeners.len())
            .finish()
    }
}

fn invoke(category: EventCategory, f: impl FnOnce()) {
    if catch_unwind(AssertUnwindSafe(f)).is_err() {
        error!(category = %category, "event listener panicked");
    }
}
