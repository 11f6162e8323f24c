//! Offloading channel between the dispatcher and delivery.

use crate::transport::Transport;
use clicktrail_audit_types::AuditRecord;
use clicktrail_common_log::{delivery_span, instrument_future, record_error};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

/// Configuration for the offloading channel.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Maximum records buffered before new ones are dropped.
    pub buffer_size: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self { buffer_size: 1_024 }
    }
}

impl CaptureConfig {
    /// Set the buffer size (at least one slot).
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size.max(1);
        self
    }
}

/// Handle for submitting finished records.
#[derive(Debug, Clone)]
pub struct AuditCapture {
    sender: mpsc::Sender<CapturedRecord>,
}

/// A record waiting for delivery.
#[derive(Debug)]
pub struct CapturedRecord {
    /// The finished record.
    pub record: AuditRecord,
    /// When the record entered the channel.
    pub captured_at: std::time::Instant,
}

impl AuditCapture {
    /// Create a capture handle and the receiving end of its channel.
    pub fn new(config: CaptureConfig) -> (Self, mpsc::Receiver<CapturedRecord>) {
        let (sender, receiver) = mpsc::channel(config.buffer_size.max(1));
        (Self { sender }, receiver)
    }

    /// Submit a record without blocking. Returns whether it was queued.
    pub fn record(&self, record: AuditRecord) -> bool {
        let event_type = record.event_type();
        let captured = CapturedRecord {
            record,
            captured_at: std::time::Instant::now(),
        };

        match self.sender.try_send(captured) {
            Ok(()) => {
                debug!(%event_type, "Audit record captured");
                true
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(%event_type, "Audit buffer full, record dropped");
                false
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                error!(%event_type, "Audit channel closed");
                false
            }
        }
    }

    /// Check if the capture channel is healthy.
    pub fn is_healthy(&self) -> bool {
        !self.sender.is_closed()
    }

    /// Get approximate buffer usage.
    pub fn buffer_usage(&self) -> f64 {
        let capacity = self.sender.capacity();
        let max_capacity = self.sender.max_capacity();
        1.0 - (capacity as f64 / max_capacity as f64)
    }
}

/// Drain `receiver`, handing each record to `transport` in its own task.
///
/// Delivery failures are logged and dropped. Returns once every sender is
/// gone and the buffer is empty.
pub async fn delivery_loop(
    mut receiver: mpsc::Receiver<CapturedRecord>,
    transport: Arc<dyn Transport>,
) {
    while let Some(captured) = receiver.recv().await {
        let transport = Arc::clone(&transport);
        let span = delivery_span(captured.record.event_type());
        tokio::spawn(instrument_future(
            async move {
                let queued_for = captured.captured_at.elapsed();
                match transport.send(&captured.record).await {
                    Ok(()) => debug!(?queued_for, "Audit record delivered"),
                    Err(e) => {
                        record_error(&e);
                        warn!(error = %e, status = ?e.status(), "Audit record delivery failed");
                    }
                }
            },
            span,
        ));
    }
    debug!("Audit delivery loop finished");
}

/// Start [`delivery_loop`] on the current runtime.
pub fn spawn_delivery(
    receiver: mpsc::Receiver<CapturedRecord>,
    transport: Arc<dyn Transport>,
) -> JoinHandle<()> {
    tokio::spawn(delivery_loop(receiver, transport))
}
