//! Command Event Logger
//!
//! Lifecycle events of every executed command, emitted on the
//! `command_events` target so the JSON file layer can be filtered to them.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::redact::redact_sensitive_data;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CommandEvent {
    Started {
        command_text: String,
        discipline: String,
    },
    FocusTransfer {
        original: Option<u64>,
        target: Option<u64>,
        attempts: u32,
        changed: bool,
    },
    ActionCompleted,
    ActionRejected {
        reason: String,
    },
    Fault {
        phase: String,
        message: String,
    },
    Restore {
        outcome: String,
    },
    Completed {
        success: bool,
        elapsed_ms: u64,
    },
    Suppressed {
        command_text: String,
    },
}

impl CommandEvent {
    fn redacted(mut self) -> Self {
        match &mut self {
            CommandEvent::Started { command_text, .. }
            | CommandEvent::Suppressed { command_text } => {
                *command_text = redact_sensitive_data(command_text);
            }
            CommandEvent::ActionRejected { reason } => {
                *reason = redact_sensitive_data(reason);
            }
            CommandEvent::Fault { message, .. } => {
                *message = redact_sensitive_data(message);
            }
            _ => {}
        }
        self
    }
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub command_id: String,
    pub timestamp: DateTime<Utc>,
    pub event: CommandEvent,
}

impl EventLogEntry {
    pub fn new(command_id: &str, event: CommandEvent) -> Self {
        Self {
            command_id: command_id.into(),
            timestamp: Utc::now(),
            event: event.redacted(),
        }
    }
}

pub struct EventLogger;

impl EventLogger {
    /// Redacts the event and hands it to the tracing system.
    pub fn log_event(command_id: &str, event: CommandEvent) {
        let entry = EventLogEntry::new(command_id, event);
        let json = serde_json::to_string(&entry.event).unwrap_or_default();
        info!(target: "command_events", command_id = %entry.command_id, event = %json, "Command event");
    }
}
