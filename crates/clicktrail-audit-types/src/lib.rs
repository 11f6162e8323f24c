//! Audit record types for Clicktrail.
//!
//! An [`AuditRecord`] is the uniform unit every captured interaction is
//! normalized into before it is shipped to the collection endpoint.

mod ack;
mod data;
mod error;
mod event_type;
mod record;
mod snapshot;

pub use ack::CollectAck;
pub use data::{
    ClickData, CustomData, EventData, FormSubmitData, InputChangeData, RouteChangeData,
};
pub use error::RecordError;
pub use event_type::EventType;
pub use record::{AuditRecord, ReceivedRecord, ANONYMOUS_USER};
pub use snapshot::Snapshot;
