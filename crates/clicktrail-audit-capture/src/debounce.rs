//! Per-element debouncing of input edits.

use crate::CaptureError;
use clicktrail_dom::NodeId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::trace;

struct PendingFlush {
    generation: u64,
    task: JoinHandle<()>,
}

#[derive(Default)]
struct DebounceState {
    next_generation: u64,
    pending: HashMap<NodeId, PendingFlush>,
}

/// Coalesces bursts of edits on one element into a single flush.
///
/// Each key has at most one pending timer. Scheduling again for the same key
/// replaces the previous timer; a replaced timer never runs its flush, even
/// if its deadline had already passed.
pub struct InputDebouncer {
    delay: Duration,
    runtime: Handle,
    state: Arc<Mutex<DebounceState>>,
}

impl InputDebouncer {
    /// Create a debouncer on the current tokio runtime.
    pub fn new(delay: Duration) -> Result<Self, CaptureError> {
        let runtime = Handle::try_current().map_err(|_| CaptureError::NoRuntime)?;
        Ok(Self::with_handle(delay, runtime))
    }

    /// Create a debouncer that spawns its timers on `runtime`.
    pub fn with_handle(delay: Duration, runtime: Handle) -> Self {
        Self {
            delay,
            runtime,
            state: Arc::new(Mutex::new(DebounceState::default())),
        }
    }

    /// Quiet period.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Restart the timer for `key`; `flush` runs once the key stays quiet
    /// for the full delay.
    pub fn schedule<F>(&self, key: NodeId, flush: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut state = self.state.lock();
        state.next_generation += 1;
        let generation = state.next_generation;

        let shared = Arc::clone(&self.state);
        let delay = self.delay;
        let task = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            let current = {
                let mut state = shared.lock();
                match state.pending.get(&key) {
                    Some(entry) if entry.generation == generation => {
                        state.pending.remove(&key);
                        true
                    }
                    _ => false,
                }
            };
            if current {
                flush();
            }
        });

        if let Some(previous) = state.pending.insert(key, PendingFlush { generation, task }) {
            trace!(node = %key, "Superseding pending input flush");
            previous.task.abort();
        }
    }

    /// Cancel the pending timer for `key`.
    pub fn cancel(&self, key: NodeId) -> bool {
        match self.state.lock().pending.remove(&key) {
            Some(entry) => {
                entry.task.abort();
                true
            }
            None => false,
        }
    }

    /// Cancel every pending timer; returns how many were cancelled.
    pub fn cancel_all(&self) -> usize {
        let drained: Vec<PendingFlush> = {
            let mut state = self.state.lock();
            state.pending.drain().map(|(_, entry)| entry).collect()
        };
        for entry in &drained {
            entry.task.abort();
        }
        drained.len()
    }

    /// Number of keys with a pending timer.
    pub fn pending(&self) -> usize {
        self.state.lock().pending.len()
    }

    /// Whether `key` has a pending timer.
    pub fn is_pending(&self, key: NodeId) -> bool {
        self.state.lock().pending.contains_key(&key)
    }
}

impl Drop for InputDebouncer {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

impl std::fmt::Debug for InputDebouncer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputDebouncer")
            .field("delay", &self.delay)
            .field("pending", &self.pending())
            .finish()
    }
}
