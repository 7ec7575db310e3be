//! Structured logging for the voxdesk dispatcher.
//!
//! Console and rolling JSON file output, command lifecycle events, and
//! redaction of utterance text before it reaches a log.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{CommandEvent, EventLogEntry, EventLogger};
pub use logger::{init_logger, LOG_FILE_PREFIX};
pub use redact::redact_sensitive_data;
