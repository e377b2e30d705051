//! Observability module for the mock HTTP client.
//!
//! The client logs through `tracing`; this module configures a subscriber
//! and keeps credentials out of logged request headers.

mod logging;

pub use logging::{init_logging, redact_header_line, LogConfig, LogLevel};

pub(crate) use logging::loggable_headers;
