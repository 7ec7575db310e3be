use async_trait::async_trait;

use crate::lifecycle::ExecutionReport;

/// The uniform contract every dispatchable command satisfies.
#[async_trait]
pub trait Command: Send + Sync {
    /// The utterance this command was built for.
    fn command_text(&self) -> &str;

    /// Run the command. Never panics on collaborator failure and never
    /// surfaces an error; `false` covers every unsuccessful outcome.
    async fn execute(&mut self) -> bool;

    /// Report of the most recent `execute`, for commands that keep one.
    fn last_report(&self) -> Option<&ExecutionReport> {
        None
    }
}
