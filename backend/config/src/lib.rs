//! `voxdesk-config`: voxdesk runtime configuration management.
//!
//! Provides:
//! - Typed config schema (logging, timing, dispatch, command sources)
//! - YAML read/write with atomic backup rotation
//! - JSON command catalog read/write
//! - `${ENV_VAR}` substitution and `VOXDESK_*` overrides
//! - Default value application
//! - Config and catalog validation

pub mod defaults;
pub mod env;
pub mod io;
pub mod schema;
pub mod validation;

// Re-export most-used types at crate root.
pub use defaults::apply_all_defaults;
pub use env::{apply_env_overrides, apply_env_overrides_with, resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use io::{
    config_dir, config_file_path, default_catalog_path, load_catalog, load_config, write_catalog,
    write_config,
};
pub use schema::VoxdeskConfig;
pub use validation::{validate, validate_catalog, ConfigValidationError, ValidationReport};

use anyhow::{Context, Result};
use std::path::Path;
use voxdesk_core::CommandDescriptor;

/// Load, substitute env vars, apply overrides and defaults, then validate.
///
/// This is the main entry point for loading a config at runtime. Validation
/// findings are logged; callers that must refuse an invalid config call
/// `validate` themselves.
pub async fn load_and_prepare(path: &Path) -> Result<VoxdeskConfig> {
    let (config, report) = load_prepared(path).await?;
    log_report(&report);
    Ok(config)
}

/// Same pipeline as [`load_and_prepare`], returning the validation report
/// instead of logging it. Used when logging is configured from the result.
pub async fn load_prepared(path: &Path) -> Result<(VoxdeskConfig, ValidationReport)> {
    let raw_config = load_config(path).await?;

    let value = serde_json::to_value(&raw_config).context("Failed to serialize config for processing")?;
    let value = resolve_env_vars(&value).context("Failed to resolve env vars in config")?;
    let config: VoxdeskConfig =
        serde_json::from_value(value).context("Failed to deserialize config after processing")?;

    let config = apply_env_overrides(config);
    let config = apply_all_defaults(config);

    let report = validate(&config);
    Ok((config, report))
}

/// Load the extra descriptors the config points at, if any.
pub async fn load_configured_catalog(config: &VoxdeskConfig) -> Result<Vec<CommandDescriptor>> {
    let Some(path) = config.catalog_path() else {
        return Ok(Vec::new());
    };
    let descriptors = load_catalog(&path).await?;
    log_report(&validate_catalog(&descriptors));
    Ok(descriptors)
}

/// Emit every warning and error in `report` through tracing.
pub fn log_report(report: &ValidationReport) {
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
}
