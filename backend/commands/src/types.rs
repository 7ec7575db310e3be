/// Dispatcher result types.
use serde::Serialize;

use crate::lifecycle::ExecutionReport;

/// What happened to one utterance handed to the dispatcher.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// Nothing handles the utterance.
    NoMatch,
    /// Same utterance inside the duplicate window.
    Suppressed { command: String },
    /// A command matched but could not be built.
    Rejected { command: String, reason: String },
    Executed {
        command: String,
        success: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        report: Option<ExecutionReport>,
    },
}

impl DispatchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DispatchOutcome::Executed { success: true, .. })
    }

    /// Id or name of the command the utterance resolved to.
    pub fn command(&self) -> Option<&str> {
        match self {
            DispatchOutcome::NoMatch => None,
            DispatchOutcome::Suppressed { command }
            | DispatchOutcome::Rejected { command, .. }
            | DispatchOutcome::Executed { command, .. } => Some(command),
        }
    }
}
