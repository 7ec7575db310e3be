use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use voxdesk_commands::DescriptorCatalog;
use voxdesk_config::{
    config_dir, config_file_path, load_configured_catalog, load_prepared, log_report, VoxdeskConfig,
};

mod list_cmd;
mod match_cmd;
mod run_cmd;
mod terminal_output;
mod validate_cmd;

#[derive(Parser)]
#[command(name = "voxdesk")]
#[command(about = "Focus-aware voice command dispatcher", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (defaults to config.yaml in the voxdesk config directory)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every command in the catalog
    List,
    /// Show which command an utterance resolves to, without running it
    Match {
        /// Utterance text
        text: String,
    },
    /// Dispatch an utterance against a simulated desktop
    Run {
        /// Utterance text
        text: String,
        /// Keep focus on the assistant through every Alt-Tab
        #[arg(long)]
        stubborn_focus: bool,
        /// Skip settle delays
        #[arg(long)]
        immediate: bool,
    },
    /// Validate the config and the command catalog
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let path = cli
        .config
        .unwrap_or_else(|| config_file_path(&config_dir()));
    let (config, report) = load_prepared(&path)
        .await
        .with_context(|| format!("Failed to load config from {}", path.display()))?;

    // Logging comes from the config, so its findings are replayed once the
    // subscriber is up. `validate` prints them itself.
    let log_dir = config.log_dir();
    voxdesk_logging::init_logger(log_dir.as_deref(), config.log_level())?;
    tracing::info!(path = %path.display(), "[Cli] Config loaded");
    if !matches!(cli.command, Commands::Validate) {
        log_report(&report);
    }

    match cli.command {
        Commands::List => {
            let catalog = build_catalog(&config).await?;
            list_cmd::run(&catalog);
        }
        Commands::Match { text } => {
            let catalog = build_catalog(&config).await?;
            match_cmd::run(&catalog, &text);
        }
        Commands::Run { text, stubborn_focus, immediate } => {
            let catalog = build_catalog(&config).await?;
            let options = run_cmd::RunOptions { stubborn_focus, immediate };
            run_cmd::run(&config, catalog, &text, options).await?;
        }
        Commands::Validate => {
            validate_cmd::run(&config).await?;
        }
    }

    Ok(())
}

/// Built-in descriptors (unless disabled) overlaid with the configured catalog.
pub(crate) async fn build_catalog(config: &VoxdeskConfig) -> Result<DescriptorCatalog> {
    let mut catalog = if config.include_builtin() {
        DescriptorCatalog::builtin()
    } else {
        DescriptorCatalog::empty()
    };
    catalog.extend(load_configured_catalog(config).await?);
    Ok(catalog)
}
