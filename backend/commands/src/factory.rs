/// Command construction and duplicate-utterance suppression.
use std::time::{Duration, Instant};

use tracing::debug;

use voxdesk_core::{CommandDescriptor, Desktop, FocusDiscipline, SettleTimings, VoxResult};
use voxdesk_logging::redact_sensitive_data;

use crate::active_window::ActiveWindowCommand;
use crate::command::Command;
use crate::specific_app::SpecificAppCommand;
use crate::system_wide::SystemWideCommand;

/// Default window inside which a repeated utterance is dropped.
pub const DEFAULT_DUPLICATE_WINDOW: Duration = Duration::from_millis(1000);

/// Builds the variant a descriptor's focus discipline calls for.
#[derive(Debug, Clone)]
pub struct CommandFactory {
    desktop: Desktop,
    timings: SettleTimings,
}

impl CommandFactory {
    pub fn new(desktop: Desktop, timings: SettleTimings) -> Self {
        Self { desktop, timings }
    }

    pub fn timings(&self) -> &SettleTimings {
        &self.timings
    }

    pub fn build(&self, text: &str, descriptor: &CommandDescriptor) -> VoxResult<Box<dyn Command>> {
        let descriptor = descriptor.clone();
        let desktop = self.desktop.clone();
        let command: Box<dyn Command> = match descriptor.focus {
            FocusDiscipline::SystemWide => {
                Box::new(SystemWideCommand::build(text, descriptor, desktop, self.timings)?)
            }
            FocusDiscipline::ActiveWindow => {
                Box::new(ActiveWindowCommand::build(text, descriptor, desktop, self.timings)?)
            }
            FocusDiscipline::SpecificApp => {
                Box::new(SpecificAppCommand::build(text, descriptor, desktop, self.timings)?)
            }
        };
        Ok(command)
    }
}

/// Drops an utterance repeated within `window` of its last execution.
///
/// Recognizers often deliver the same phrase twice; commands flagged for
/// rapid repeat bypass the check.
#[derive(Debug, Clone)]
pub struct DuplicateGuard {
    window: Duration,
    last: Option<(String, Instant)>,
}

impl DuplicateGuard {
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    /// True when `normalized` repeats the last recorded utterance inside
    /// the window. Read-only; see [`DuplicateGuard::record`].
    pub fn is_duplicate(&self, normalized: &str, exempt: bool) -> bool {
        self.is_duplicate_at(normalized, exempt, Instant::now())
    }

    /// Remember `normalized` as the latest executed utterance. Called only
    /// once a command has actually been built.
    pub fn record(&mut self, normalized: &str) {
        self.record_at(normalized, Instant::now());
    }

    fn is_duplicate_at(&self, normalized: &str, exempt: bool, now: Instant) -> bool {
        if exempt {
            return false;
        }
        let Some((text, at)) = &self.last else {
            return false;
        };
        if text == normalized && now.duration_since(*at) < self.window {
            debug!(text = %redact_sensitive_data(normalized), "[Factory] Duplicate utterance suppressed");
            return true;
        }
        false
    }

    fn record_at(&mut self, normalized: &str, now: Instant) {
        self.last = Some((normalized.to_string(), now));
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

impl Default for DuplicateGuard {
    fn default() -> Self {
        Self::new(DEFAULT_DUPLICATE_WINDOW)
    }
}
