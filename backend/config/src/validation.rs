//! Config validation: config sanity checks plus descriptor catalog checks,
//! reported with field paths.

use std::collections::HashSet;

use thiserror::Error;
use voxdesk_core::{CommandDescriptor, FocusDiscipline, KeyChord};

use crate::schema::VoxdeskConfig;

/// Upper bound on any single settle delay before we warn.
const MAX_REASONABLE_DELAY_MS: u64 = 10_000;

/// Symbolic chords handled by dedicated volume calls.
const SYMBOLIC_CHORDS: &[&str] = &["volumeup", "volumedown", "volumemute", "mute"];

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Fold another report into this one.
    pub fn merge(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &VoxdeskConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_logging(config, &mut report);
    validate_timing(config, &mut report);
    validate_dispatch(config, &mut report);
    validate_commands(config, &mut report);
    report
}

fn validate_logging(config: &VoxdeskConfig, report: &mut ValidationReport) {
    let Some(logging) = &config.logging else { return };
    if let Some(level) = &logging.level {
        if !matches!(
            level.to_lowercase().as_str(),
            "trace" | "debug" | "info" | "warn" | "error" | "off"
        ) {
            report.warn(
                "logging.level",
                format!("'{level}' is not a plain level; it will be used as a tracing filter"),
            );
        }
    }
    if logging.file_output == Some(true) && logging.dir.as_deref().map(str::trim) == Some("") {
        report.error("logging.dir", "File output is enabled but the log directory is empty");
    }
}

fn validate_timing(config: &VoxdeskConfig, report: &mut ValidationReport) {
    let t = config.settle_timings();
    for (field, value) in [
        ("retargetSettleMs", t.retarget_settle_ms),
        ("actionSettleMs", t.action_settle_ms),
        ("restoreSettleMs", t.restore_settle_ms),
        ("appLaunchWaitMs", t.app_launch_wait_ms),
        ("appReadyWaitMs", t.app_ready_wait_ms),
    ] {
        if value > MAX_REASONABLE_DELAY_MS {
            report.warn(
                format!("timing.{field}"),
                format!("{value} ms is unusually long; commands will feel unresponsive"),
            );
        }
    }
}

fn validate_dispatch(config: &VoxdeskConfig, report: &mut ValidationReport) {
    let Some(dispatch) = &config.dispatch else { return };
    if dispatch.duplicate_window_ms == Some(0) {
        report.warn(
            "dispatch.duplicateWindowMs",
            "Duplicate suppression is disabled; recognizer double-fires will run twice",
        );
    }
}

fn validate_commands(config: &VoxdeskConfig, report: &mut ValidationReport) {
    if !config.include_builtin() && config.catalog_path().is_none() {
        report.error(
            "commands",
            "Built-in commands are disabled and no catalogPath is set; nothing can be dispatched",
        );
    }
}

/// Validate a descriptor catalog. Paths are `commands[<index>].<field>`.
pub fn validate_catalog(descriptors: &[CommandDescriptor]) -> ValidationReport {
    let mut report = ValidationReport::default();
    let mut seen = HashSet::new();

    for (i, d) in descriptors.iter().enumerate() {
        let path = format!("commands[{i}]");

        if d.id.trim().is_empty() {
            report.error(format!("{path}.id"), "Command id cannot be empty");
        } else if !seen.insert(d.id.as_str()) {
            report.error(format!("{path}.id"), format!("Duplicate command id '{}'", d.id));
        }

        if d.triggers.iter().all(|t| t.trim().is_empty()) {
            report.warn(format!("{path}.triggers"), "No trigger phrases; the command can never match");
        }

        if d.focus == FocusDiscipline::SpecificApp && d.target().is_none() {
            report.error(
                format!("{path}.targetApplication"),
                "SpecificApp commands must name a target application",
            );
        }

        match d.keys() {
            None => report.warn(format!("{path}.keyCombination"), "No key combination; execution will fail"),
            Some(keys) => check_chord(&mut report, format!("{path}.keyCombination"), d.focus, keys),
        }
        if let Some(alt) = d.alternative_key_combination.as_deref().filter(|k| !k.trim().is_empty()) {
            check_chord(&mut report, format!("{path}.alternativeKeyCombination"), d.focus, alt);
        }
    }

    report
}

fn check_chord(report: &mut ValidationReport, path: String, focus: FocusDiscipline, keys: &str) {
    if focus == FocusDiscipline::SystemWide && SYMBOLIC_CHORDS.contains(&keys.to_lowercase().as_str()) {
        return;
    }
    if let Err(e) = keys.parse::<KeyChord>() {
        report.warn(path, e.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{CommandsConfig, DispatchConfig};

    #[test]
    fn empty_config_is_valid() {
        let report = validate(&VoxdeskConfig::default());
        assert!(report.is_valid(), "errors: {:?}", report.errors);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn nothing_to_dispatch_is_error() {
        let mut cfg = VoxdeskConfig::default();
        cfg.commands = Some(CommandsConfig {
            include_builtin: Some(false),
            catalog_path: None,
        });
        let report = validate(&cfg);
        assert!(!report.is_valid());
        assert_eq!(report.errors[0].path, "commands");
    }

    #[test]
    fn zero_duplicate_window_warns() {
        let mut cfg = VoxdeskConfig::default();
        cfg.dispatch = Some(DispatchConfig {
            duplicate_window_ms: Some(0),
        });
        let report = validate(&cfg);
        assert!(report.is_valid());
        assert_eq!(report.warnings[0].path, "dispatch.duplicateWindowMs");
    }

    #[test]
    fn catalog_problems_are_reported_by_path() {
        let descriptors = vec![
            CommandDescriptor::new("save", "Save", FocusDiscipline::ActiveWindow)
                .with_triggers(["save"])
                .with_keys("Ctrl+S"),
            CommandDescriptor::new("save", "Save again", FocusDiscipline::ActiveWindow)
                .with_triggers(["store"])
                .with_keys("Ctrl+Shift+Q+W"),
            CommandDescriptor::new("inbox", "Inbox", FocusDiscipline::SpecificApp)
                .with_triggers(["inbox"])
                .with_keys("Ctrl+Shift+I"),
            CommandDescriptor::new("vol", "Volume", FocusDiscipline::SystemWide)
                .with_triggers(["louder"])
                .with_keys("VolumeUp"),
        ];
        let report = validate_catalog(&descriptors);

        let error_paths: Vec<_> = report.errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(error_paths, vec!["commands[1].id", "commands[2].targetApplication"]);

        let warning_paths: Vec<_> = report.warnings.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(warning_paths, vec!["commands[1].keyCombination"]);
    }

    #[test]
    fn missing_chord_and_triggers_warn() {
        let descriptors = vec![CommandDescriptor::new("noop", "Noop", FocusDiscipline::ActiveWindow)];
        let report = validate_catalog(&descriptors);
        assert!(report.is_valid());
        assert_eq!(report.warnings.len(), 2);
    }
}
