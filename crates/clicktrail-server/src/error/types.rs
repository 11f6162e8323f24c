//! API error types.

use crate::sink::SinkError;
use axum::http::StatusCode;
use clicktrail_audit_types::RecordError;
use thiserror::Error;

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// API error enum covering all error cases.
#[derive(Debug, Error)]
pub enum ApiError {
    // 400 Bad Request
    #[error("Invalid audit record: {0}")]
    InvalidRecord(#[from] RecordError),

    // 404 Not Found
    #[error("{0} not found")]
    NotFound(String),

    // 500 Internal Server Error
    #[error("Failed to store audit record")]
    Sink(#[from] SinkError),
}

impl ApiError {
    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRecord(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Sink(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code for client handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidRecord(_) => "invalid_record",
            Self::NotFound(_) => "not_found",
            Self::Sink(_) => "sink_error",
        }
    }

    /// Check if this is a server error (5xx).
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        let invalid = ApiError::from(RecordError::Decode(
            serde_json::from_str::<serde_json::Value>("{").unwrap_err(),
        ));
        assert_eq!(invalid.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(invalid.error_code(), "invalid_record");
        assert!(!invalid.is_server_error());

        let sink = ApiError::from(SinkError::Io(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "stdout closed",
        )));
        assert_eq!(sink.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(sink.error_code(), "sink_error");
        assert!(sink.is_server_error());

        let missing = ApiError::NotFound("Route".into());
        assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(missing.error_code(), "not_found");
        assert_eq!(missing.to_string(), "Route not found");
    }
}
