//! voxdesk runtime configuration schema.
//!
//! Every section and field is optional on disk; `defaults` fills the gaps
//! and the accessors below read the effective values.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use voxdesk_core::SettleTimings;

use crate::defaults::{DEFAULT_DUPLICATE_WINDOW_MS, DEFAULT_LOG_LEVEL};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoxdeskConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging: Option<LoggingConfig>,

    /// Settle delays around focus changes and synthesized input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timing: Option<TimingConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dispatch: Option<DispatchConfig>,

    /// Where command descriptors come from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commands: Option<CommandsConfig>,
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>, // "trace" | "debug" | "info" | "warn" | "error"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_output: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retarget_settle_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_settle_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restore_settle_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_launch_wait_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_ready_wait_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duplicate_window_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandsConfig {
    /// JSON file of extra or overriding descriptors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_builtin: Option<bool>,
}

// ---------------------------------------------------------------------------
// Effective values
// ---------------------------------------------------------------------------

impl VoxdeskConfig {
    pub fn log_level(&self) -> &str {
        self.logging
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .unwrap_or(DEFAULT_LOG_LEVEL)
    }

    /// Log directory when file output is enabled.
    pub fn log_dir(&self) -> Option<PathBuf> {
        let logging = self.logging.as_ref()?;
        if logging.file_output == Some(false) {
            return None;
        }
        logging.dir.as_ref().map(PathBuf::from)
    }

    pub fn settle_timings(&self) -> SettleTimings {
        let base = SettleTimings::default();
        let Some(t) = &self.timing else { return base };
        SettleTimings {
            retarget_settle_ms: t.retarget_settle_ms.unwrap_or(base.retarget_settle_ms),
            action_settle_ms: t.action_settle_ms.unwrap_or(base.action_settle_ms),
            restore_settle_ms: t.restore_settle_ms.unwrap_or(base.restore_settle_ms),
            app_launch_wait_ms: t.app_launch_wait_ms.unwrap_or(base.app_launch_wait_ms),
            app_ready_wait_ms: t.app_ready_wait_ms.unwrap_or(base.app_ready_wait_ms),
        }
    }

    pub fn duplicate_window(&self) -> Duration {
        let ms = self
            .dispatch
            .as_ref()
            .and_then(|d| d.duplicate_window_ms)
            .unwrap_or(DEFAULT_DUPLICATE_WINDOW_MS);
        Duration::from_millis(ms)
    }

    pub fn catalog_path(&self) -> Option<PathBuf> {
        self.commands
            .as_ref()
            .and_then(|c| c.catalog_path.as_deref())
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
    }

    pub fn include_builtin(&self) -> bool {
        self.commands
            .as_ref()
            .and_then(|c| c.include_builtin)
            .unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_reads_defaults() {
        let cfg = VoxdeskConfig::default();
        assert_eq!(cfg.log_level(), DEFAULT_LOG_LEVEL);
        assert_eq!(cfg.settle_timings(), SettleTimings::default());
        assert_eq!(cfg.duplicate_window(), Duration::from_millis(DEFAULT_DUPLICATE_WINDOW_MS));
        assert!(cfg.include_builtin());
        assert!(cfg.catalog_path().is_none());
        assert!(cfg.log_dir().is_none());
    }

    #[test]
    fn partial_timing_overrides_only_named_fields() {
        let cfg: VoxdeskConfig = serde_yaml::from_str("timing:\n  actionSettleMs: 50\n").unwrap();
        let t = cfg.settle_timings();
        assert_eq!(t.action_settle_ms, 50);
        assert_eq!(t.app_launch_wait_ms, SettleTimings::default().app_launch_wait_ms);
    }

    #[test]
    fn disabled_file_output_hides_log_dir() {
        let cfg: VoxdeskConfig =
            serde_yaml::from_str("logging:\n  dir: /tmp/vox\n  fileOutput: false\n").unwrap();
        assert!(cfg.log_dir().is_none());
    }
}
