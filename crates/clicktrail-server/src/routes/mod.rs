//! Route configuration for the collection server.

mod audit;
mod health;
mod pages;

use crate::{config::ServerConfig, error::ApiError, state::AppState};
use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, Request, Response},
    Router,
};
use clicktrail_common_log::request_span;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{warn, Span};

/// Create the application router.
pub fn create_router(state: AppState, config: &ServerConfig) -> Router {
    let common_middleware = ServiceBuilder::new()
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::new(config.server.request_timeout()))
        .layer(cors_layer(&config.cors.allowed_origins))
        .layer(DefaultBodyLimit::disable())
        .map_response(|response: Response<_>| response.map(Body::new))
        .layer(RequestBodyLimitLayer::new(config.server.body_limit_bytes));

    let api = Router::new()
        .merge(audit::router())
        .merge(pages::router())
        .merge(health::router());

    Router::new()
        .nest("/api", api)
        .fallback(fallback_handler)
        .layer(common_middleware)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(make_request_span)
                .on_response(record_status),
        )
        .with_state(state)
}

/// Allow the listed origins, or any origin when the list is empty.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

fn make_request_span(request: &Request<Body>) -> Span {
    request_span(request.method(), request.uri().path())
}

fn record_status(response: &Response<Body>, _latency: Duration, span: &Span) {
    span.record("status", response.status().as_u16());
}

async fn fallback_handler() -> ApiError {
    ApiError::NotFound("Route".into())
}
