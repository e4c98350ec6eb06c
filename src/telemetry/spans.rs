//! Span utilities for storage operations.

use tracing::{info_span, Span};

/// Extension trait for recording an operation's outcome into a span.
pub trait SpanExt {
    fn record_result<T, E>(&self, result: &Result<T, E>)
    where
        E: std::fmt::Display;
}

impl SpanExt for Span {
    fn record_result<T, E>(&self, result: &Result<T, E>)
    where
        E: std::fmt::Display,
    {
        match result {
            Ok(_) => {
                self.record("status", "ok");
            }
            Err(e) => {
                self.record("status", "error");
                self.record("error.message", e.to_string().as_str());
            }
        }
    }
}

/// Factory for storage operation spans.
pub struct IoSpan;

impl IoSpan {
    /// Create an `io_operation` span.
    ///
    /// Fields:
    /// - `operation`: "save" or "load"
    /// - `handler`: backend kind
    /// - `location`: path or URL
    /// - `status`, `error.message`: filled by `SpanExt::record_result`
    /// - `bytes`: weight bytes moved, filled on success
    pub fn new(operation: &'static str, handler: &'static str, location: &str) -> Span {
        info_span!(
            "io_operation",
            operation = operation,
            handler = handler,
            location = %location,
            status = tracing::field::Empty,
            error.message = tracing::field::Empty,
            bytes = tracing::field::Empty,
        )
    }
}
