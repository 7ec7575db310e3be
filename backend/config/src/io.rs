//! Config and catalog file IO with atomic writes and backup rotation.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;
use tracing::{debug, info, warn};
use voxdesk_core::CommandDescriptor;

use crate::schema::VoxdeskConfig;

/// Default config file name within the config directory.
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Default catalog file name within the config directory.
const CATALOG_FILE_NAME: &str = "commands.json";

/// Number of rolling backups to keep.
const MAX_BACKUPS: usize = 5;

/// Resolve the voxdesk config directory.
/// Priority: `VOXDESK_CONFIG_DIR` env > `~/.voxdesk/` > `./.voxdesk`
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("VOXDESK_CONFIG_DIR") {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }
    match dirs::home_dir() {
        Some(home) => home.join(".voxdesk"),
        None => PathBuf::from(".voxdesk"),
    }
}

/// Resolve the full path to the main config file.
pub fn config_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

pub fn default_catalog_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CATALOG_FILE_NAME)
}

/// Load and parse the config from disk.
///
/// Returns `Ok(Default::default())` if the file doesn't exist (first run).
pub async fn load_config(path: &Path) -> Result<VoxdeskConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(VoxdeskConfig::default());
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    // An empty file parses as YAML null.
    if raw.trim().is_empty() {
        return Ok(VoxdeskConfig::default());
    }

    let config: VoxdeskConfig = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    Ok(config)
}

/// Write config to disk atomically, keeping rolling backups.
pub async fn write_config(config: &VoxdeskConfig, path: &Path) -> Result<()> {
    let yaml = serde_yaml::to_string(config).context("Failed to serialize config to YAML")?;
    write_atomic(path, yaml.as_bytes()).await?;
    info!(path = %path.display(), "Wrote config");
    Ok(())
}

/// Load a JSON array of command descriptors.
pub async fn load_catalog(path: &Path) -> Result<Vec<CommandDescriptor>> {
    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read command catalog: {}", path.display()))?;

    let descriptors: Vec<CommandDescriptor> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse command catalog JSON at: {}", path.display()))?;

    info!(path = %path.display(), count = descriptors.len(), "Loaded command catalog");
    Ok(descriptors)
}

/// Write command descriptors as pretty JSON, atomically.
pub async fn write_catalog(descriptors: &[CommandDescriptor], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(descriptors).context("Failed to serialize command catalog")?;
    write_atomic(path, json.as_bytes()).await?;
    info!(path = %path.display(), count = descriptors.len(), "Wrote command catalog");
    Ok(())
}

/// Write to a temp file beside `path`, then rename over it.
async fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    if path.exists() {
        rotate_backups(path).await?;
    }

    let tmp_path = sibling(path, "tmp");
    fs::write(&tmp_path, contents)
        .await
        .with_context(|| format!("Failed to write temp file: {}", tmp_path.display()))?;

    fs::rename(&tmp_path, path)
        .await
        .with_context(|| format!("Failed to rename temp file to: {}", path.display()))?;
    Ok(())
}

/// `config.yaml` + `bak.1` -> `config.yaml.bak.1`
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

/// Rotate backup files: .bak.1 -> .bak.2 -> ... -> .bak.N
async fn rotate_backups(path: &Path) -> Result<()> {
    for i in (1..MAX_BACKUPS).rev() {
        let old = sibling(path, &format!("bak.{i}"));
        let new = sibling(path, &format!("bak.{}", i + 1));
        if old.exists() {
            if let Err(e) = fs::rename(&old, &new).await {
                warn!("Failed to rotate backup {}: {}", old.display(), e);
            }
        }
    }

    let bak = sibling(path, "bak.1");
    if let Err(e) = fs::copy(path, &bak).await {
        warn!("Failed to create backup {}: {}", bak.display(), e);
    }

    Ok(())
}
