//! HTTP client configuration.

use crate::RequestBuilder;
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Request timeout.
    pub request_timeout: Duration,
    /// User agent string.
    pub user_agent: String,
    /// Maximum idle connections per host.
    pub pool_max_idle_per_host: usize,
    /// Enable gzip decompression.
    pub gzip: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            request_timeout: Duration::from_secs(10),
            user_agent: format!("clicktrail/{}", env!("CARGO_PKG_VERSION")),
            pool_max_idle_per_host: 4,
            gzip: true,
        }
    }
}

/// Build a configured HTTP client.
pub fn build_client(config: HttpConfig) -> Result<Client, HttpError> {
    let mut builder = ClientBuilder::new()
        .connect_timeout(config.connect_timeout)
        .timeout(config.request_timeout)
        .user_agent(&config.user_agent)
        .pool_max_idle_per_host(config.pool_max_idle_per_host);

    if config.gzip {
        builder = builder.gzip(true);
    }

    builder.build().map_err(HttpError::ClientBuild)
}

/// HTTP errors.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("request timed out")]
    Timeout,

    #[error("server error: {status}")]
    ServerError { status: u16, body: String },

    #[error("client error: {status}")]
    ClientError { status: u16, body: String },
}

impl HttpError {
    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ServerError { status, .. } | Self::ClientError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for HttpError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            HttpError::Timeout
        } else {
            HttpError::Request(e)
        }
    }
}

/// Shared HTTP client.
#[derive(Debug, Clone)]
pub struct HttpClient {
    inner: Client,
    request: RequestBuilder,
}

impl HttpClient {
    /// Create a new HTTP client with default config.
    pub fn new() -> Result<Self, HttpError> {
        Self::with_config(HttpConfig::default())
    }

    /// Create a new HTTP client with custom config.
    pub fn with_config(config: HttpConfig) -> Result<Self, HttpError> {
        let inner = build_client(config)?;
        Ok(Self {
            inner,
            request: RequestBuilder::new().json_content(),
        })
    }

    /// Use `request` for base URL and default headers.
    pub fn with_request(mut self, request: RequestBuilder) -> Self {
        self.request = request;
        self
    }

    /// Get the inner reqwest client.
    pub fn inner(&self) -> &Client {
        &self.inner
    }

    /// Base URL and default headers.
    pub fn request(&self) -> &RequestBuilder {
        &self.request
    }

    /// POST a JSON body to `path` (resolved against the base URL).
    pub async fn post_json<T: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<reqwest::Response, HttpError> {
        let url = self.request.url(path);
        tracing::debug!(%url, "Making POST request");
        let response = self
            .inner
            .post(&url)
            .headers(self.request.headers().clone())
            .json(body)
            .send()
            .await
            .map_err(HttpError::from)?;
        tracing::debug!(status = %response.status(), %url, "POST response");
        Ok(response)
    }

    /// Check response status and convert errors.
    pub async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, HttpError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();

        if status.is_server_error() {
            Err(HttpError::ServerError {
                status: status.as_u16(),
                body,
            })
        } else {
            Err(HttpError::ClientError {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_default_config() {
        let config = HttpConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert!(config.user_agent.starts_with("clicktrail/"));
        assert_eq!(config.pool_max_idle_per_host, 4);
        assert!(config.gzip);
    }

    #[test]
    fn test_client_with_custom_config() {
        let config = HttpConfig {
            connect_timeout: Duration::from_secs(1),
            request_timeout: Duration::from_secs(2),
            user_agent: "test-agent".to_string(),
            pool_max_idle_per_host: 1,
            gzip: false,
        };

        let client = HttpClient::with_config(config).unwrap();
        assert!(client.request().headers().contains_key(reqwest::header::CONTENT_TYPE));
    }

    #[test]
    fn test_error_status() {
        assert_eq!(HttpError::Timeout.status(), None);
        assert_eq!(
            HttpError::ClientError {
                status: 404,
                body: String::new(),
            }
            .status(),
            Some(404)
        );
    }
}
