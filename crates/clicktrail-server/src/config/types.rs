//! Server configuration types.

use serde::{Deserialize, Serialize};
use std::net::{AddrParseError, SocketAddr};
use std::time::Duration;

/// Main server configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server binding configuration.
    #[serde(default)]
    pub server: ServerBindConfig,
    /// CORS configuration.
    #[serde(default)]
    pub cors: CorsConfig,
    /// Where accepted records are written.
    #[serde(default)]
    pub sink: SinkConfig,
}

impl ServerConfig {
    /// Address the server binds to.
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        self.server.socket_addr()
    }
}

/// Server binding configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerBindConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Request timeout.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// Maximum accepted request body.
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3001
}

fn default_request_timeout() -> u64 {
    30
}

fn default_body_limit() -> usize {
    64 * 1024
}

impl Default for ServerBindConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

impl ServerBindConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins. Any origin is allowed when empty.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Sink backends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkKind {
    /// Write one line per record to stdout.
    #[default]
    Console,
}

/// Sink configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SinkConfig {
    #[serde(default)]
    pub kind: SinkKind,
    /// Also print the full record as indented JSON.
    #[serde(default)]
    pub pretty: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.server.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.sink.kind, SinkKind::Console);
        assert!(config.cors.allowed_origins.is_empty());
        assert_eq!(config.socket_addr().unwrap().port(), 3001);
    }

    #[test]
    fn test_bad_host_is_an_error() {
        let mut config = ServerConfig::default();
        config.server.host = "not a host".into();
        assert!(config.socket_addr().is_err());
    }
}
