//! Environment handling for config values.
//!
//! Two mechanisms:
//! - `${VAR_NAME}` references inside string values, resolved at load time.
//!   Only uppercase `[A-Z_][A-Z0-9_]*` names are matched.
//! - `VOXDESK_*` override variables that replace whole fields.

use std::collections::HashMap;
use std::sync::LazyLock;

use anyhow::{bail, Result};
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

use crate::schema::{CommandsConfig, DispatchConfig, LoggingConfig, VoxdeskConfig};

pub const ENV_LOG_LEVEL: &str = "VOXDESK_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "VOXDESK_LOG_DIR";
pub const ENV_CATALOG: &str = "VOXDESK_CATALOG";
pub const ENV_DUPLICATE_WINDOW_MS: &str = "VOXDESK_DUPLICATE_WINDOW_MS";

/// Pattern matching valid uppercase env var names.
static ENV_VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

/// Error returned for missing env vars.
#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

// ---------------------------------------------------------------------------
// ${VAR} substitution
// ---------------------------------------------------------------------------

/// Substitute `${VAR}` references in a config JSON value tree.
///
/// Only string leaves are processed. Errors if a referenced var is unset or
/// empty.
pub fn resolve_env_vars(value: &Value) -> Result<Value> {
    resolve_env_vars_with(value, &std::env::vars().collect())
}

/// Substitute env vars using a provided map (useful for testing).
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    substitute_value(value, env, "")
}

fn substitute_value(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(arr) => {
            let result: Result<Vec<_>> = arr
                .iter()
                .enumerate()
                .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
                .collect();
            Ok(Value::Array(result?))
        }
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                let child_path = if path.is_empty() {
                    k.clone()
                } else {
                    format!("{path}.{k}")
                };
                result.insert(k.clone(), substitute_value(v, env, &child_path)?);
            }
            Ok(Value::Object(result))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    if !s.contains("${") {
        return Ok(s.to_string());
    }

    if let Some(caps) = ENV_VAR_PATTERN
        .captures_iter(s)
        .find(|caps| env.get(&caps[1]).map_or(true, |v| v.is_empty()))
    {
        bail!(MissingEnvVarError {
            var_name: caps[1].to_string(),
            config_path: path.to_string(),
        });
    }

    let substituted = ENV_VAR_PATTERN.replace_all(s, |caps: &regex::Captures| {
        env.get(&caps[1]).cloned().unwrap_or_default()
    });
    Ok(substituted.into_owned())
}

/// Check whether a string contains any env var references.
pub fn contains_env_var_reference(s: &str) -> bool {
    s.contains('$') && ENV_VAR_PATTERN.is_match(s)
}

// ---------------------------------------------------------------------------
// VOXDESK_* overrides
// ---------------------------------------------------------------------------

/// Apply `VOXDESK_*` overrides from the process environment.
pub fn apply_env_overrides(config: VoxdeskConfig) -> VoxdeskConfig {
    apply_env_overrides_with(config, &std::env::vars().collect())
}

/// Apply `VOXDESK_*` overrides from a provided map. Empty values are ignored.
pub fn apply_env_overrides_with(mut config: VoxdeskConfig, env: &HashMap<String, String>) -> VoxdeskConfig {
    let get = |name: &str| env.get(name).map(|v| v.trim()).filter(|v| !v.is_empty());

    if let Some(level) = get(ENV_LOG_LEVEL) {
        debug!(var = ENV_LOG_LEVEL, "Config override from environment");
        config.logging.get_or_insert_with(LoggingConfig::default).level = Some(level.to_string());
    }
    if let Some(dir) = get(ENV_LOG_DIR) {
        debug!(var = ENV_LOG_DIR, "Config override from environment");
        config.logging.get_or_insert_with(LoggingConfig::default).dir = Some(dir.to_string());
    }
    if let Some(path) = get(ENV_CATALOG) {
        debug!(var = ENV_CATALOG, "Config override from environment");
        config.commands.get_or_insert_with(CommandsConfig::default).catalog_path = Some(path.to_string());
    }
    if let Some(raw) = get(ENV_DUPLICATE_WINDOW_MS) {
        match raw.parse::<u64>() {
            Ok(ms) => {
                config.dispatch.get_or_insert_with(DispatchConfig::default).duplicate_window_ms = Some(ms);
            }
            Err(_) => warn!(var = ENV_DUPLICATE_WINDOW_MS, value = %raw, "Ignoring non-numeric override"),
        }
    }

    config
}
