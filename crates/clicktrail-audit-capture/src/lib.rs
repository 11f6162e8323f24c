//! Interaction capture for Clicktrail.
//!
//! This crate turns document interactions into [`AuditRecord`]s and ships
//! them off the interaction path. It includes:
//!
//! - A filter policy deciding which targets are audit-worthy
//! - Bounded, privacy-safe element snapshots
//! - Per-field debouncing of input edits
//! - A capture dispatcher with symmetric mount/unmount
//! - A non-blocking offloading channel and fire-and-forget transports
//!
//! ```no_run
//! use clicktrail_audit_capture::{
//!     spawn_delivery, AuditCapture, CaptureConfig, CaptureDispatcher, HttpTransport,
//!     TrackingContext, TrackingOptions,
//! };
//! use clicktrail_dom::Document;
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let (capture, receiver) = AuditCapture::new(CaptureConfig::default());
//! spawn_delivery(receiver, Arc::new(HttpTransport::new("http://localhost:3001")?));
//!
//! let document = Document::new("/");
//! let mut dispatcher =
//!     CaptureDispatcher::new(document.clone(), TrackingContext::new(), capture);
//! dispatcher.mount(TrackingOptions::default())?;
//! document.navigate("/checkout");
//! # Ok(())
//! # }
//! ```

mod builder;
mod capture;
mod config;
mod context;
mod custom;
mod debounce;
mod dispatcher;
mod error;
pub mod filter;
mod snapshot;
mod transport;

pub use builder::RecordBuilder;
pub use capture::{delivery_loop, spawn_delivery, AuditCapture, CaptureConfig, CapturedRecord};
pub use config::{
    FilterConfig, FilterOptions, PrivacyConfig, PrivacyOptions, TrackingConfig, TrackingOptions,
    DEFAULT_DEBOUNCE_MS, DEFAULT_MAX_TEXT_LENGTH,
};
pub use context::TrackingContext;
pub use custom::{CustomEvent, CustomEventChannel, SubscriptionId};
pub use debounce::InputDebouncer;
pub use dispatcher::CaptureDispatcher;
pub use error::{CaptureError, ConfigError};
pub use filter::{should_track, FilterDecision, OPT_OUT_ATTRIBUTE};
pub use snapshot::{extract, truncate_text};
pub use transport::{HttpTransport, MemoryTransport, Transport, TransportError, AUDIT_LOG_PATH};

// Re-export types for convenience
pub use clicktrail_audit_types::{AuditRecord, EventData, EventType, Snapshot};
