//! Telemetry: structured logging and operation spans.

mod logging;
mod spans;

pub use logging::{init_logging, LogConfig, LogError, LogFormat};
pub use spans::{IoSpan, SpanExt};
