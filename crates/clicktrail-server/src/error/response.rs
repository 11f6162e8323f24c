//! Error response implementation.

use super::types::ApiError;
use axum::{
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, warn};

/// Error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    success: bool,
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            error!(error = %self, code = self.error_code(), "server error occurred");
        } else {
            warn!(error = %self, code = self.error_code(), "request rejected");
        }

        let message = match &self {
            ApiError::Sink(err) if cfg!(debug_assertions) => format!("{}: {}", self, err),
            _ => self.to_string(),
        };

        let body = ErrorResponse {
            success: false,
            error: ErrorBody {
                code: self.error_code(),
                message,
            },
        };

        (self.status_code(), Json(body)).into_response()
    }
}

