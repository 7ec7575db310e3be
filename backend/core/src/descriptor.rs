/// Command descriptors: the data record behind every dispatchable command.
///
/// Descriptors are supplied already parsed (built-in catalog or the JSON
/// catalog file); the lifecycle only reads them.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default wait after initiating a focus change, in milliseconds.
pub const DEFAULT_FOCUS_DELAY_MS: u64 = 500;

// ---------------------------------------------------------------------------
// Focus discipline
// ---------------------------------------------------------------------------

/// Which focus-handling policy a command requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FocusDiscipline {
    /// No foreign window involved (volume, lock screen, ...).
    SystemWide,
    /// Some foreign window, reached by switching to the previous window.
    #[default]
    ActiveWindow,
    /// A named application must gain focus.
    SpecificApp,
}

impl fmt::Display for FocusDiscipline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FocusDiscipline::SystemWide => "system-wide",
            FocusDiscipline::ActiveWindow => "active-window",
            FocusDiscipline::SpecificApp => "specific-app",
        };
        f.write_str(label)
    }
}

// ---------------------------------------------------------------------------
// Descriptor
// ---------------------------------------------------------------------------

/// One logical command: triggers, focus discipline, action encoding and timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandDescriptor {
    pub id: String,
    pub name: String,
    /// Trigger phrases, in match priority order.
    #[serde(default)]
    pub triggers: Vec<String>,
    #[serde(default)]
    pub focus: FocusDiscipline,
    /// Required for `SpecificApp`, ignored otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_application: Option<String>,
    /// Return focus to the assistant window once the action completes.
    #[serde(default = "default_restore_focus")]
    pub restore_focus: bool,
    #[serde(default = "default_focus_delay_ms")]
    pub delay_after_focus_change_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_combination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternative_key_combination: Option<String>,
    #[serde(default)]
    pub description: String,
    /// Exempt from duplicate-utterance suppression.
    #[serde(default)]
    pub allow_rapid_repeat: bool,
}

fn default_restore_focus() -> bool {
    true
}

fn default_focus_delay_ms() -> u64 {
    DEFAULT_FOCUS_DELAY_MS
}

impl CommandDescriptor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, focus: FocusDiscipline) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            triggers: Vec::new(),
            focus,
            target_application: None,
            restore_focus: true,
            delay_after_focus_change_ms: DEFAULT_FOCUS_DELAY_MS,
            key_combination: None,
            alternative_key_combination: None,
            description: String::new(),
            allow_rapid_repeat: false,
        }
    }

    pub fn with_triggers<I, S>(mut self, triggers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.triggers = triggers.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_keys(mut self, combo: impl Into<String>) -> Self {
        self.key_combination = Some(combo.into());
        self
    }

    pub fn with_alternative_keys(mut self, combo: impl Into<String>) -> Self {
        self.alternative_key_combination = Some(combo.into());
        self
    }

    pub fn with_target(mut self, app: impl Into<String>) -> Self {
        self.target_application = Some(app.into());
        self
    }

    pub fn with_delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_after_focus_change_ms = delay_ms;
        self
    }

    pub fn with_restore_focus(mut self, restore: bool) -> Self {
        self.restore_focus = restore;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn rapid_repeat(mut self) -> Self {
        self.allow_rapid_repeat = true;
        self
    }

    /// Primary key combination, or `None` when unset or blank.
    pub fn keys(&self) -> Option<&str> {
        self.key_combination
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    /// Target application, or `None` when unset or blank.
    pub fn target(&self) -> Option<&str> {
        self.target_application
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}
