//! The capture dispatcher.
//!
//! A mounted dispatcher owns one capture-phase listener per enabled DOM
//! event category, one history subscription and one custom-event
//! subscription. Each intercepted event runs through the filter policy,
//! the snapshot extractor and the record builder before the finished record
//! is handed to the offloading channel.
//!
//! Input edits are routed through an [`InputDebouncer`] so that a burst of
//! changes to one field produces a single record reflecting the value at
//! flush time.

use crate::builder::RecordBuilder;
use crate::config::{TrackingConfig, TrackingOptions};
use crate::custom::{CustomEvent, CustomEventChannel, SubscriptionId};
use crate::debounce::InputDebouncer;
use crate::filter;
use crate::snapshot::extract;
use crate::{AuditCapture, CaptureError, TrackingContext};
use clicktrail_audit_types::{
    AuditRecord, ClickData, CustomData, EventData, FormSubmitData, InputChangeData,
    RouteChangeData, Snapshot,
};
use clicktrail_common_log::capture_span;
use clicktrail_dom::{
    Document, DomEvent, Element, EventCategory, EventKind, HistoryListenerId, ListenerId,
    Navigation, NodeId, Phase,
};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::{Arc, Weak};
use tracing::{debug, info};

/// Everything a mounted listener needs to turn an event into a record.
struct Pipeline {
    config: Arc<TrackingConfig>,
    document: Document,
    builder: RecordBuilder,
    capture: AuditCapture,
    debouncer: Option<InputDebouncer>,
    /// Held while a record is handed to the channel, so that `unmount`
    /// returns only after any in-flight emit has finished.
    live: Mutex<bool>,
}

impl Pipeline {
    fn is_live(&self) -> bool {
        *self.live.lock()
    }

    fn shut_down(&self) {
        *self.live.lock() = false;
    }

    fn emit(&self, data: impl Into<EventData>, element_info: Option<Snapshot>) {
        let live = self.live.lock();
        if !*live {
            return;
        }
        let record: AuditRecord = self.builder.build(data, element_info);
        self.capture.record(record);
    }

    fn snapshot(&self, element: &Element) -> Snapshot {
        extract(element, &self.config.privacy)
    }

    fn on_navigation(&self, navigation: &Navigation) {
        let _span = capture_span("navigation").entered();
        debug!(from = %navigation.from, to = %navigation.to, "Route change");
        self.emit(
            RouteChangeData {
                previous_path: Some(navigation.from.clone()),
            },
            None,
        );
    }

    fn on_click(&self, event: &DomEvent) {
        let _span = capture_span(EventCategory::Click).entered();
        let EventKind::Click { x, y, button } = event.kind() else {
            return;
        };
        let target = event.target();
        let decision = filter::evaluate(target, &self.config.filter);
        if !decision.is_track() {
            debug!(%decision, tag = target.tag_name(), "Click not tracked");
            return;
        }
        self.emit(ClickData { x, y, button }, Some(self.snapshot(target)));
    }

    fn on_submit(&self, event: &DomEvent) {
        let _span = capture_span(EventCategory::Submit).entered();
        let form = event.target();
        let fields = form
            .node_id()
            .map(|node| self.document.form_fields(node))
            .unwrap_or_default();

        let mut names: Vec<String> = Vec::new();
        for name in fields.iter().filter_map(|field| field.name()) {
            if !names.iter().any(|existing| existing == name) {
                names.push(name.to_string());
            }
        }

        let form_values = self.config.privacy.log_form_values.then(|| {
            fields
                .iter()
                .filter(|field| !field.is_password())
                .filter_map(|field| {
                    let name = field.name()?;
                    Some((name.to_string(), field.value().unwrap_or_default().to_string()))
                })
                .collect::<BTreeMap<_, _>>()
        });

        let data = FormSubmitData {
            form_fields: names,
            form_values,
            form_action: form.attribute("action"),
            form_method: form.attribute("method"),
        };
        self.emit(data, Some(self.snapshot(form)));
    }

    fn on_change(self: &Arc<Self>, event: &DomEvent) {
        let _span = capture_span(EventCategory::Change).entered();
        let target = event.target();
        if !target.is_text_input() {
            debug!(tag = target.tag_name(), "Change on non-text control ignored");
            return;
        }
        let decision = filter::evaluate(target, &self.config.filter);
        if !decision.is_track() {
            debug!(%decision, tag = target.tag_name(), "Input not tracked");
            return;
        }
        let (Some(node), Some(debouncer)) = (target.node_id(), &self.debouncer) else {
            return;
        };

        let pipeline: Weak<Self> = Arc::downgrade(self);
        let last_known = target.clone();
        debouncer.schedule(node, move || {
            if let Some(pipeline) = pipeline.upgrade() {
                pipeline.flush_input(node, last_known);
            }
        });
    }

    fn flush_input(&self, node: NodeId, last_known: Element) {
        if !self.is_live() {
            return;
        }
        let element = self.document.element(node).unwrap_or(last_known);
        let value = element.value().unwrap_or_default();
        let input_type = if element.tag_name() == "textarea" {
            "textarea".to_string()
        } else {
            element
                .input_type()
                .map(str::to_ascii_lowercase)
                .unwrap_or_else(|| "text".to_string())
        };
        let reveal = self.config.privacy.log_input_values && !element.is_password();

        let data = InputChangeData {
            input_type,
            value_length: value.chars().count(),
            field_name: element.name().map(str::to_string),
            value: reveal.then(|| value.to_string()),
        };
        debug!(%node, "Flushing debounced input");
        self.emit(data, Some(self.snapshot(&element)));
    }

    fn on_custom(&self, event: &CustomEvent) {
        let _span = capture_span("custom").entered();
        let element_info = event.element_selector.as_deref().and_then(|selector| {
            match self.document.query_selector(selector) {
                Ok(Some(element)) => Some(self.snapshot(&element)),
                Ok(None) => {
                    debug!(selector, "Custom event selector matched nothing");
                    None
                }
                Err(e) => {
                    debug!(selector, error = %e, "Custom event selector invalid");
                    None
                }
            }
        });

        let data = CustomData::new(
            event.event_type.clone(),
            event.custom_data.clone().unwrap_or_default(),
        );
        self.emit(data, element_info);
    }
}

/// Registrations belonging to one mount.
struct Mount {
    pipeline: Arc<Pipeline>,
    listeners: Vec<ListenerId>,
    history: Option<HistoryListenerId>,
    custom: SubscriptionId,
}

/// Intercepts document interactions and turns them into audit records.
pub struct CaptureDispatcher {
    document: Document,
    builder: RecordBuilder,
    capture: AuditCapture,
    custom_events: CustomEventChannel,
    mount: Option<Mount>,
}

impl CaptureDispatcher {
    /// Create an unmounted dispatcher.
    pub fn new(document: Document, context: TrackingContext, capture: AuditCapture) -> Self {
        Self {
            builder: RecordBuilder::new(context, document.clone()),
            document,
            capture,
            custom_events: CustomEventChannel::new(),
            mount: None,
        }
    }

    /// Mount with `options` merged over the defaults, replacing any
    /// previous mount.
    ///
    /// Fails with [`CaptureError::NoRuntime`] when input tracking is enabled
    /// outside a tokio runtime; the previous mount is left untouched then.
    pub fn mount(&mut self, options: TrackingOptions) -> Result<(), CaptureError> {
        let config = options.resolve();
        let debouncer = if config.enable_input_tracking {
            Some(InputDebouncer::new(config.debounce())?)
        } else {
            None
        };

        self.unmount();

        let pipeline = Arc::new(Pipeline {
            config: Arc::new(config),
            document: self.document.clone(),
            builder: self.builder.clone(),
            capture: self.capture.clone(),
            debouncer,
            live: Mutex::new(true),
        });
        let config = Arc::clone(&pipeline.config);

        let mut listeners = Vec::new();
        if config.enable_click_tracking {
            let p = Arc::clone(&pipeline);
            listeners.push(self.document.add_listener(EventCategory::Click, Phase::Capture, move |e| {
                p.on_click(e)
            }));
        }
        if config.enable_form_tracking {
            let p = Arc::clone(&pipeline);
            listeners.push(self.document.add_listener(EventCategory::Submit, Phase::Capture, move |e| {
                p.on_submit(e)
            }));
        }
        if config.enable_input_tracking {
            let p = Arc::clone(&pipeline);
            listeners.push(self.document.add_listener(EventCategory::Change, Phase::Capture, move |e| {
                p.on_change(e)
            }));
        }

        let history = config.enable_route_tracking.then(|| {
            let p = Arc::clone(&pipeline);
            self.document.listen_history(move |navigation| p.on_navigation(navigation))
        });

        let custom = {
            let p = Arc::clone(&pipeline);
            self.custom_events.subscribe(move |event| p.on_custom(event))
        };

        info!(
            route = config.enable_route_tracking,
            click = config.enable_click_tracking,
            form = config.enable_form_tracking,
            input = config.enable_input_tracking,
            debounce_ms = config.debounce_time,
            "Capture dispatcher mounted"
        );

        if config.enable_route_tracking {
            pipeline.emit(RouteChangeData::default(), None);
        }

        self.mount = Some(Mount {
            pipeline,
            listeners,
            history,
            custom,
        });
        Ok(())
    }

    /// Remove every registration and cancel pending input flushes.
    pub fn unmount(&mut self) {
        let Some(mount) = self.mount.take() else {
            return;
        };
        mount.pipeline.shut_down();

        for id in &mount.listeners {
            self.document.remove_listener(*id);
        }
        if let Some(id) = mount.history {
            self.document.unlisten_history(id);
        }
        self.custom_events.unsubscribe(mount.custom);

        let cancelled = mount
            .pipeline
            .debouncer
            .as_ref()
            .map_or(0, InputDebouncer::cancel_all);
        info!(cancelled, "Capture dispatcher unmounted");
    }

    /// Whether the dispatcher is mounted.
    pub fn is_active(&self) -> bool {
        self.mount.is_some()
    }

    /// Configuration of the current mount.
    pub fn config(&self) -> Option<&TrackingConfig> {
        self.mount.as_ref().map(|m| m.pipeline.config.as_ref())
    }

    /// Emitter for custom events.
    pub fn custom_events(&self) -> &CustomEventChannel {
        &self.custom_events
    }

    /// Number of inputs waiting for their debounce period to elapse.
    pub fn pending_inputs(&self) -> usize {
        self.mount
            .as_ref()
            .and_then(|m| m.pipeline.debouncer.as_ref())
            .map_or(0, InputDebouncer::pending)
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn context(&self) -> &TrackingContext {
        self.builder.context()
    }
}

impl Drop for CaptureDispatcher {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl std::fmt::Debug for CaptureDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureDispatcher")
            .field("active", &self.is_active())
            .field("config", &self.config())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CaptureConfig;
    use clicktrail_audit_types::EventType;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;
    use tokio::sync::mpsc;

    fn setup() -> (CaptureDispatcher, mpsc::Receiver<crate::CapturedRecord>) {
        let (capture, receiver) = AuditCapture::new(CaptureConfig::default());
        let dispatcher =
            CaptureDispatcher::new(Document::new("/home"), TrackingContext::new(), capture);
        (dispatcher, receiver)
    }

    fn without_input() -> TrackingOptions {
        TrackingOptions {
            enable_input_tracking: Some(false),
            ..Default::default()
        }
    }

    #[test]
    fn test_mount_without_runtime_fails_for_input() {
        let (mut dispatcher, _rx) = setup();
        assert!(matches!(
            dispatcher.mount(TrackingOptions::default()),
            Err(CaptureError::NoRuntime)
        ));
        assert!(!dispatcher.is_active());
        assert!(dispatcher.mount(without_input()).is_ok());
    }

    #[test]
    fn test_initial_page_view() {
        let (mut dispatcher, mut rx) = setup();
        dispatcher.mount(without_input()).unwrap();

        let record = rx.try_recv().unwrap().record;
        assert_eq!(record.event_type(), EventType::RouteChange);
        assert_eq!(record.path, "/home");
        assert_eq!(record.data, EventData::RouteChange(RouteChangeData::default()));
    }

    #[test]
    fn test_disabled_categories_register_nothing() {
        let (mut dispatcher, _rx) = setup();
        dispatcher
            .mount(TrackingOptions {
                enable_click_tracking: Some(false),
                enable_route_tracking: Some(false),
                ..without_input()
            })
            .unwrap();

        let document = dispatcher.document().clone();
        assert_eq!(document.listener_count(EventCategory::Click), 0);
        assert_eq!(document.listener_count(EventCategory::Submit), 1);
        assert_eq!(document.listener_count(EventCategory::Change), 0);
        assert_eq!(document.history_listener_count(), 0);
    }

    #[test]
    fn test_remount_replaces_listeners() {
        let (mut dispatcher, _rx) = setup();
        dispatcher.mount(without_input()).unwrap();
        dispatcher
            .mount(TrackingOptions {
                enable_form_tracking: Some(false),
                ..without_input()
            })
            .unwrap();

        let document = dispatcher.document().clone();
        assert_eq!(document.listener_count(EventCategory::Click), 1);
        assert_eq!(document.listener_count(EventCategory::Submit), 0);
        assert_eq!(document.history_listener_count(), 1);
        assert_eq!(dispatcher.custom_events().subscriber_count(), 1);
        assert!(!dispatcher.config().unwrap().enable_form_tracking);
    }

    #[test]
    fn test_drop_unmounts() {
        let (mut dispatcher, _rx) = setup();
        let document = dispatcher.document().clone();
        dispatcher.mount(without_input()).unwrap();
        assert_eq!(document.listener_count(EventCategory::Click), 1);

        drop(dispatcher);
        assert_eq!(document.listener_count(EventCategory::Click), 0);
        assert_eq!(document.history_listener_count(), 0);
    }

    #[test]
    fn test_emit_after_unmount_is_dropped() {
        let (mut dispatcher, mut rx) = setup();
        dispatcher.mount(without_input()).unwrap();
        let pipeline = Arc::clone(&dispatcher.mount.as_ref().unwrap().pipeline);
        assert!(rx.try_recv().is_ok());

        let input = dispatcher.document().append(Element::new("input"));

        dispatcher.unmount();
        pipeline.emit(RouteChangeData::default(), None);
        pipeline.flush_input(input, Element::new("input"));

        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_no_records_after_unmount_returns() {
        let (mut dispatcher, mut rx) = setup();
        dispatcher
            .mount(TrackingOptions {
                enable_route_tracking: Some(false),
                ..without_input()
            })
            .unwrap();
        let pipeline = Arc::clone(&dispatcher.mount.as_ref().unwrap().pipeline);
        let stop = Arc::new(AtomicBool::new(false));

        let workers: Vec<_> = (0..4)
            .map(|_| {
                let pipeline = Arc::clone(&pipeline);
                let stop = Arc::clone(&stop);
                std::thread::spawn(move || {
                    while !stop.load(Ordering::Relaxed) {
                        pipeline.emit(CustomData::new("tick", Default::default()), None);
                        std::thread::yield_now();
                    }
                })
            })
            .collect();

        std::thread::sleep(Duration::from_millis(20));
        dispatcher.unmount();
        while rx.try_recv().is_ok() {}

        std::thread::sleep(Duration::from_millis(20));
        stop.store(true, Ordering::Relaxed);
        for worker in workers {
            worker.join().unwrap();
        }
        assert!(rx.try_recv().is_err());
    }
}
