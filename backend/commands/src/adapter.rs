/// Bridge from the two-way context/response command abstraction to the
/// uniform `execute -> bool` contract.
use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::command::Command;

// ---------------------------------------------------------------------------
// Two-way command types
// ---------------------------------------------------------------------------

/// What the UI should do with a response beyond speaking it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommandActionType {
    #[default]
    None,
    ShowHtml,
    OpenUrl,
    PlayAudio,
    ShowNotification,
    ExecuteSystem,
    NavigateApp,
}

/// Input handed to a two-way command.
#[derive(Debug, Clone, Default)]
pub struct CommandContext {
    pub raw_command: String,
    pub parameters: HashMap<String, String>,
    /// Scratch state shared between a command and its caller.
    pub state: HashMap<String, serde_json::Value>,
}

impl CommandContext {
    pub fn new(raw_command: impl Into<String>) -> Self {
        Self {
            raw_command: raw_command.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResponse {
    pub is_success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_content: Option<String>,
    #[serde(default)]
    pub action_type: CommandActionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CommandResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            is_success: true,
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        let error = error.into();
        Self {
            is_success: false,
            message: error.clone(),
            error: Some(error),
            ..Self::default()
        }
    }

    pub fn with_voice(mut self, text: impl Into<String>) -> Self {
        self.voice_output = Some(text.into());
        self
    }

    pub fn with_action(mut self, action: CommandActionType) -> Self {
        self.action_type = action;
        self
    }
}

/// A richer command that decides for itself which utterances it handles.
#[async_trait]
pub trait SystemCommand: Send + Sync {
    fn name(&self) -> &str;

    fn can_handle(&self, text: &str) -> bool;

    /// `Ok(None)` means the command produced no response.
    async fn execute(&self, ctx: &mut CommandContext) -> Result<Option<CommandResponse>>;
}

// ---------------------------------------------------------------------------
// Adapter
// ---------------------------------------------------------------------------

pub struct CommandAdapter {
    handler: Arc<dyn SystemCommand>,
    context: CommandContext,
    last_response: Option<CommandResponse>,
}

impl CommandAdapter {
    pub fn new(handler: Arc<dyn SystemCommand>, text: impl Into<String>) -> Self {
        Self {
            handler,
            context: CommandContext::new(text),
            last_response: None,
        }
    }

    pub fn can_handle(&self, text: &str) -> bool {
        self.handler.can_handle(text)
    }

    /// Rebind the utterance the next `execute` runs with.
    pub fn set_command_text(&mut self, text: impl Into<String>) {
        self.context.raw_command = text.into();
    }

    pub fn context_mut(&mut self) -> &mut CommandContext {
        &mut self.context
    }

    /// Response of the most recent `execute`, if it produced one.
    pub fn last_response(&self) -> Option<&CommandResponse> {
        self.last_response.as_ref()
    }
}

#[async_trait]
impl Command for CommandAdapter {
    fn command_text(&self) -> &str {
        &self.context.raw_command
    }

    async fn execute(&mut self) -> bool {
        let name = self.handler.name().to_string();
        self.last_response = None;
        match self.handler.execute(&mut self.context).await {
            Ok(Some(response)) => {
                info!(command = %name, success = response.is_success, "[Adapter] Command responded");
                let success = response.is_success;
                self.last_response = Some(response);
                success
            }
            Ok(None) => {
                warn!(command = %name, "[Adapter] Command returned no response");
                false
            }
            Err(e) => {
                error!(command = %name, error = %e, "[Adapter] Command failed");
                false
            }
        }
    }
}
