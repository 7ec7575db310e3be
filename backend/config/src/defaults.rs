//! Config defaults: fills unset fields so a written-back config documents
//! the effective values.

use voxdesk_core::SettleTimings;

use crate::io::config_dir;
use crate::schema::{CommandsConfig, DispatchConfig, LoggingConfig, TimingConfig, VoxdeskConfig};

/// Default tracing filter when neither config nor `RUST_LOG` sets one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default duplicate-utterance window.
pub const DEFAULT_DUPLICATE_WINDOW_MS: u64 = 1000;

/// Log directory name inside the config dir.
pub const DEFAULT_LOG_DIR_NAME: &str = "logs";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: VoxdeskConfig) -> VoxdeskConfig {
    let config = apply_logging_defaults(config);
    let config = apply_timing_defaults(config);
    let config = apply_dispatch_defaults(config);
    apply_commands_defaults(config)
}

fn apply_logging_defaults(mut config: VoxdeskConfig) -> VoxdeskConfig {
    let logging = config.logging.get_or_insert_with(LoggingConfig::default);
    if logging.level.is_none() {
        logging.level = Some(DEFAULT_LOG_LEVEL.to_string());
    }
    if logging.file_output.is_none() {
        logging.file_output = Some(true);
    }
    if logging.dir.is_none() {
        let dir = config_dir().join(DEFAULT_LOG_DIR_NAME);
        logging.dir = Some(dir.to_string_lossy().into_owned());
    }
    config
}

fn apply_timing_defaults(mut config: VoxdeskConfig) -> VoxdeskConfig {
    let base = SettleTimings::default();
    let timing = config.timing.get_or_insert_with(TimingConfig::default);
    timing.retarget_settle_ms.get_or_insert(base.retarget_settle_ms);
    timing.action_settle_ms.get_or_insert(base.action_settle_ms);
    timing.restore_settle_ms.get_or_insert(base.restore_settle_ms);
    timing.app_launch_wait_ms.get_or_insert(base.app_launch_wait_ms);
    timing.app_ready_wait_ms.get_or_insert(base.app_ready_wait_ms);
    config
}

fn apply_dispatch_defaults(mut config: VoxdeskConfig) -> VoxdeskConfig {
    let dispatch = config.dispatch.get_or_insert_with(DispatchConfig::default);
    dispatch.duplicate_window_ms.get_or_insert(DEFAULT_DUPLICATE_WINDOW_MS);
    config
}

fn apply_commands_defaults(mut config: VoxdeskConfig) -> VoxdeskConfig {
    let commands = config.commands.get_or_insert_with(CommandsConfig::default);
    commands.include_builtin.get_or_insert(true);
    config
}
