//! Structured Logger
//!
//! Wraps `tracing` with a console layer, an optional daily-rolling JSON file
//! layer, and `RUST_LOG`-aware level control.

use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// File name prefix of the rolling log, e.g. `voxdesk.log.2026-10-15`.
pub const LOG_FILE_PREFIX: &str = "voxdesk.log";

/// Initialize the global structured logger.
///
/// `RUST_LOG` wins over `level` when set. Passing `None` for `log_dir`
/// disables file output. Calling this twice is harmless; the second
/// subscriber is dropped.
pub fn init_logger(log_dir: Option<&Path>, level: &str) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let file_layer = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log dir: {}", dir.display()))?;
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix(LOG_FILE_PREFIX)
                .build(dir)
                .with_context(|| format!("Failed to open log file in {}", dir.display()))?;
            Some(fmt::layer().json().with_writer(appender).with_ansi(false))
        }
        None => None,
    };

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(true);

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();

    Ok(())
}
