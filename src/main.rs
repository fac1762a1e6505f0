use anyhow::Result;
use clap::Parser;
use std::path::Path;
use std::sync::Arc;

use echo_nexus::cli::commands::{
    init::InitCommand, memory::MemoryCommand, memory_store, new_id::NewIdCommand,
    process::ProcessCommand, show_how_to_get_started, validate::ValidateCommand,
};
use echo_nexus::cli::{Cli, Commands, MemoryAction};
use echo_nexus::config::{EchoNexusConfig, ObservabilityConfig, DEFAULT_CONFIG_FILE};
use echo_nexus::envelope::TriggerOverrides;
use echo_nexus::fs::StandardFileSystem;
use echo_nexus::telemetry::init_telemetry;

/// Load layered configuration, then bring up logging from it.
fn load_config(path: Option<&Path>, env_loaded: bool) -> Result<EchoNexusConfig> {
    let config = EchoNexusConfig::load(path)?;
    init_telemetry(&config.observability)?;
    if env_loaded {
        tracing::info!("Loaded environment variables from .env file");
    }
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let env_loaded = EchoNexusConfig::load_env_file()?;

    match cli.command {
        // Default behavior: no subcommand - explain how to get started
        None => tokio::runtime::Runtime::new()?.block_on(async { show_how_to_get_started().await }),
        Some(Commands::Process {
            operation_id,
            command,
            inputs,
            session_id,
            event_path,
            event_name,
            commit_state,
        }) => {
            let overrides = TriggerOverrides {
                operation_id,
                command,
                inputs,
                session_id,
            };
            let config = match load_config(cli.config.as_deref(), env_loaded) {
                Ok(config) => config,
                Err(e) => {
                    // The status report is still owed to the dispatcher.
                    let fallback = EchoNexusConfig::platform_defaults();
                    init_telemetry(&fallback.observability)?;
                    tracing::error!(error = %e, "Failed to load configuration");
                    tokio::runtime::Runtime::new()?.block_on(async {
                        ProcessCommand::new(fallback, overrides)
                            .report_startup_failure(&e)
                            .await
                    });
                    return Err(e);
                }
            };
            tokio::runtime::Runtime::new()?.block_on(async {
                ProcessCommand::new(config, overrides)
                    .with_event(event_path, event_name)
                    .with_commit_state(commit_state)
                    .execute()
                    .await
            })
        }
        Some(Commands::Validate { operation_id }) => ValidateCommand::new(operation_id).execute(),
        Some(Commands::NewId) => NewIdCommand.execute(),
        Some(Commands::Memory { action }) => {
            let config = load_config(cli.config.as_deref(), env_loaded)?;
            let command = MemoryCommand::new(Arc::new(memory_store(&config)));
            tokio::runtime::Runtime::new()?.block_on(async {
                match action {
                    MemoryAction::Show { operation_id } => command.show(operation_id.as_deref()).await,
                    MemoryAction::Stats => command.stats().await,
                }
            })
        }
        Some(Commands::Init { force, dry_run }) => {
            // The file being written may not exist yet, so it is not loaded.
            init_telemetry(&ObservabilityConfig::default())?;
            let config_path = cli
                .config
                .as_deref()
                .map(|path| path.to_string_lossy().into_owned())
                .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());
            tokio::runtime::Runtime::new()?.block_on(async {
                InitCommand::new(force, dry_run, Arc::new(StandardFileSystem))
                    .with_config_path(config_path)
                    .execute()
                    .await
            })
        }
    }
}
