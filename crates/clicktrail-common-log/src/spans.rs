//! Span helpers for the capture and collection paths.

use std::fmt::Display;
use std::future::Future;
use tracing::{debug_span, info_span, Instrument, Span};

/// Span around handling one intercepted DOM event.
pub fn capture_span(category: impl Display) -> Span {
    debug_span!("capture", category = %category)
}

/// Span around delivering one record.
pub fn delivery_span(event_type: impl Display) -> Span {
    debug_span!("delivery", event_type = %event_type, error = tracing::field::Empty)
}

/// Span around one inbound HTTP request.
pub fn request_span(method: impl Display, path: &str) -> Span {
    info_span!("request", method = %method, path = %path, status = tracing::field::Empty)
}

/// Instrument a future with a span.
pub fn instrument_future<F: Future>(future: F, span: Span) -> impl Future<Output = F::Output> {
    future.instrument(span)
}

/// Record an error on the current span.
pub fn record_error(error: &dyn std::error::Error) {
    Span::current().record("error", tracing::field::display(error));
}

/// Timing utility for operations.
#[derive(Debug)]
pub struct Timer {
    start: std::time::Instant,
    operation: &'static str,
}

impl Timer {
    /// Start a new timer.
    pub fn start(operation: &'static str) -> Self {
        Self {
            start: std::time::Instant::now(),
            operation,
        }
    }

    /// Complete the timer and log the duration.
    pub fn finish(self) -> std::time::Duration {
        let duration = self.start.elapsed();
        tracing::debug!(
            operation = %self.operation,
            duration_us = %duration.as_micros(),
            "operation completed"
        );
        duration
    }
}

/// Time a block of code.
#[macro_export]
macro_rules! timed {
    ($name:expr, $body:expr) => {{
        let _timer = $crate::spans::Timer::start($name);
        let result = $body;
        _timer.finish();
        result
    }};
}
