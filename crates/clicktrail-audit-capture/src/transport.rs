//! Delivery of finished records.

use async_trait::async_trait;
use clicktrail_audit_types::{AuditRecord, CollectAck};
use clicktrail_common_http::{
    parse_json, HttpClient, HttpConfig, HttpError, RequestBuilder, ResponseError,
};
use tokio::sync::mpsc;

/// Path of the collection endpoint.
pub const AUDIT_LOG_PATH: &str = "/api/audit-log";

/// Transport errors. The delivery loop logs them and moves on.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error(transparent)]
    Http(#[from] HttpError),

    #[error("invalid acknowledgement: {0}")]
    Response(#[from] ResponseError),

    #[error("collector rejected record: {0}")]
    Rejected(String),

    #[error("transport closed")]
    Closed,
}

impl TransportError {
    /// HTTP status returned by the collector, if it answered with an error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http(err) => err.status(),
            _ => None,
        }
    }
}

/// Sends one record somewhere.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver `record`. Called once per record; never retried.
    async fn send(&self, record: &AuditRecord) -> Result<(), TransportError>;
}

/// POSTs records as JSON to a collection endpoint.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: HttpClient,
}

impl HttpTransport {
    /// Transport for the collector at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, TransportError> {
        Self::with_config(base_url, HttpConfig::default())
    }

    /// Transport with explicit client settings.
    pub fn with_config(
        base_url: impl Into<String>,
        config: HttpConfig,
    ) -> Result<Self, TransportError> {
        let client = HttpClient::with_config(config)?.with_request(
            RequestBuilder::new()
                .base_url(base_url)
                .json_content()
                .client_id(concat!("clicktrail-audit-capture/", env!("CARGO_PKG_VERSION"))),
        );
        Ok(Self { client })
    }

    /// Endpoint URL records are sent to.
    pub fn endpoint(&self) -> String {
        self.client.request().url(AUDIT_LOG_PATH)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, record: &AuditRecord) -> Result<(), TransportError> {
        let response = self.client.post_json(AUDIT_LOG_PATH, record).await?;
        let response = HttpClient::check_response(response).await?;
        let ack: CollectAck = parse_json(response).await?;
        if !ack.success {
            return Err(TransportError::Rejected(ack.message));
        }
        tracing::trace!(event_type = %ack.event_type, "Collector acknowledged record");
        Ok(())
    }
}

/// Hands records to an in-process channel.
#[derive(Debug, Clone)]
pub struct MemoryTransport {
    sender: mpsc::UnboundedSender<AuditRecord>,
}

impl MemoryTransport {
    /// Create the transport and the receiver records arrive on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<AuditRecord>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn send(&self, record: &AuditRecord) -> Result<(), TransportError> {
        self.sender
            .send(record.clone())
            .map_err(|_| TransportError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clicktrail_audit_types::RouteChangeData;

    #[test]
    fn test_endpoint() {
        let transport = HttpTransport::new("http://localhost:3001/").unwrap();
        assert_eq!(transport.endpoint(), "http://localhost:3001/api/audit-log");
    }

    #[tokio::test]
    async fn test_memory_transport() {
        let (transport, mut receiver) = MemoryTransport::new();
        let record = AuditRecord::new("u", "/", RouteChangeData::default());
        transport.send(&record).await.unwrap();
        assert_eq!(receiver.recv().await, Some(record.clone()));

        drop(receiver);
        assert!(matches!(transport.send(&record).await, Err(TransportError::Closed)));
    }

    #[test]
    fn test_status() {
        let rejected = TransportError::from(HttpError::ServerError {
            status: 503,
            body: String::new(),
        });
        assert_eq!(rejected.status(), Some(503));
        assert_eq!(TransportError::from(HttpError::Timeout).status(), None);
        assert_eq!(TransportError::Closed.status(), None);
    }
}
