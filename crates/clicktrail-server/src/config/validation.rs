//! Configuration validation.

use super::types::ServerConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid port: {0}")]
    InvalidPort(u16),

    #[error("Invalid bind address: {0}")]
    InvalidAddress(String),

    #[error("Request body limit must be greater than zero")]
    InvalidBodyLimit,

    #[error("Request timeout must be greater than zero")]
    InvalidTimeout,

    #[error("Invalid CORS origin: {0}")]
    InvalidOrigin(String),
}

/// Validate server configuration.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.server.port == 0 {
        errors.push(ConfigError::InvalidPort(0));
    }

    if config.server.socket_addr().is_err() {
        errors.push(ConfigError::InvalidAddress(config.server.host.clone()));
    }

    if config.server.body_limit_bytes == 0 {
        errors.push(ConfigError::InvalidBodyLimit);
    }

    if config.server.request_timeout_secs == 0 {
        errors.push(ConfigError::InvalidTimeout);
    }

    for origin in &config.cors.allowed_origins {
        if axum::http::HeaderValue::from_str(origin).is_err() {
            errors.push(ConfigError::InvalidOrigin(origin.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_port() {
        let mut config = ServerConfig::default();
        config.server.port = 0;

        let result = validate_config(&config);
        assert!(result.unwrap_err().iter().any(|e| matches!(e, ConfigError::InvalidPort(0))));
    }

    #[test]
    fn test_invalid_body_limit() {
        let mut config = ServerConfig::default();
        config.server.body_limit_bytes = 0;

        let result = validate_config(&config);
        assert!(result.unwrap_err().iter().any(|e| matches!(e, ConfigError::InvalidBodyLimit)));
    }

    #[test]
    fn test_invalid_timeout() {
        let mut config = ServerConfig::default();
        config.server.request_timeout_secs = 0;

        let result = validate_config(&config);
        assert!(result.unwrap_err().iter().any(|e| matches!(e, ConfigError::InvalidTimeout)));
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = ServerConfig::default();
        config.server.port = 0;
        config.server.host = "bad host".into();
        config.cors.allowed_origins = vec!["http://ok.example".into(), "bad\norigin".into()];

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| matches!(e, ConfigError::InvalidOrigin(_))));
    }

    #[test]
    fn test_valid_config() {
        assert!(validate_config(&ServerConfig::default()).is_ok());
    }
}
