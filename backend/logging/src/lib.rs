//! Structured logging for the Showroom console.
//!
//! Console output plus a daily-rolling NDJSON file, redaction of tokens and
//! contact details, console events and operator notices.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{ConsoleEvent, EventLogEntry, EventLogger, NoticeLogger};
pub use logger::{init_logger, LoggerGuard};
pub use redact::redact_sensitive_data;
