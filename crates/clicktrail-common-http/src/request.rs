//! Request defaults: base URL and headers.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};

/// Common HTTP headers.
pub mod headers {
    pub const CONTENT_TYPE_JSON: &str = "application/json";
    /// Identifies the emitting client library.
    pub const X_CLICKTRAIL_CLIENT: &str = "x-clicktrail-client";
}

/// Base URL plus headers applied to every request.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    headers: HeaderMap,
    base_url: Option<String>,
}

impl RequestBuilder {
    /// Create a new request builder.
    pub fn new() -> Self {
        Self {
            headers: HeaderMap::new(),
            base_url: None,
        }
    }

    /// Set the base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Add a header. Invalid names or values are ignored.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name.as_ref()),
            HeaderValue::try_from(value.as_ref()),
        ) {
            self.headers.insert(name, value);
        } else {
            tracing::warn!(header = name.as_ref(), "Ignoring invalid header");
        }
        self
    }

    /// Tag requests with the client name and version.
    pub fn client_id(self, client: impl AsRef<str>) -> Self {
        self.header(headers::X_CLICKTRAIL_CLIENT, client)
    }

    /// Set content type to JSON.
    pub fn json_content(mut self) -> Self {
        self.headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static(headers::CONTENT_TYPE_JSON),
        );
        self
    }

    /// Get the built headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Resolve `path` against the base URL.
    pub fn url(&self, path: &str) -> String {
        match &self.base_url {
            Some(base) => format!("{}{}", base.trim_end_matches('/'), path),
            None => path.to_string(),
        }
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}
