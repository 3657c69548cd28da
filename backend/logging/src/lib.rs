//! Telemetry and structured logging components for bugscope.
//!
//! Handles log redaction, JSON output generation, file rotation, and analysis event logging.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{AnalysisEvent, EventLogEntry, EventLogger};
pub use logger::{init_logger, LoggerOptions};
pub use redact::redact_sensitive_data;
