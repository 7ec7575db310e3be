//! `voxdesk validate`

use anyhow::{bail, Result};
use voxdesk_config::{validate, validate_catalog, ValidationReport, VoxdeskConfig};

use crate::build_catalog;
use crate::terminal_output::{note_error, note_success, note_warn};

pub async fn run(config: &VoxdeskConfig) -> Result<()> {
    let mut report = validate(config);

    match build_catalog(config).await {
        Ok(catalog) => {
            report.merge(validate_catalog(catalog.all()));
            println!("Catalog: {} commands", catalog.len());
        }
        Err(e) => {
            note_error(&format!("Catalog could not be loaded: {e:#}"));
            bail!("catalog could not be loaded");
        }
    }

    print_report(&report);

    if report.is_valid() {
        note_success("Configuration is valid.");
        Ok(())
    } else {
        bail!("{} validation error(s)", report.errors.len())
    }
}

fn print_report(report: &ValidationReport) {
    for warning in &report.warnings {
        note_warn(&format!("{}: {}", warning.path, warning.message));
    }
    for error in &report.errors {
        note_error(&format!("{}: {}", error.path, error.message));
    }
}

#[cfg(test)]
mod tests {
    use voxdesk_config::schema::CommandsConfig;

    use super::*;

    #[tokio::test]
    async fn default_config_is_valid() {
        assert!(run(&VoxdeskConfig::default()).await.is_ok());
    }

    #[tokio::test]
    async fn missing_catalog_file_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let config = VoxdeskConfig {
            commands: Some(CommandsConfig {
                catalog_path: Some(tmp.path().join("absent.json").display().to_string()),
                include_builtin: Some(true),
            }),
            ..Default::default()
        };
        assert!(run(&config).await.is_err());
    }
}
