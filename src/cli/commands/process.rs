use anyhow::{Context, Result};
use statig::prelude::IntoStateMachineExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::warn;

use crate::artifacts::{ArtifactWriter, StatusReport};
use crate::cli::commands::memory_store;
use crate::config::EchoNexusConfig;
use crate::envelope::{
    OperationEnvelope, TriggerError, TriggerOverrides, TriggerPayload, TriggerSource,
};
use crate::git::{publish_state, Git2Operations, PublishOutcome};
use crate::handlers::{CommandRegistry, Resolution};
use crate::lifecycle::{RunEvent, RunLifecycle, RunOutcome};
use crate::processor::{ProcessReport, Processor};
use crate::telemetry::generate_correlation_id;

pub struct ProcessCommand {
    config: EchoNexusConfig,
    overrides: TriggerOverrides,
    event_path: Option<PathBuf>,
    event_name: Option<String>,
    commit_state: bool,
}

impl ProcessCommand {
    pub fn new(config: EchoNexusConfig, overrides: TriggerOverrides) -> Self {
        let commit_state = config.git.commit_state;
        Self {
            config,
            overrides,
            event_path: None,
            event_name: None,
            commit_state,
        }
    }

    pub fn with_event(mut self, event_path: Option<PathBuf>, event_name: Option<String>) -> Self {
        self.event_path = event_path;
        self.event_name = event_name;
        self
    }

    /// `--commit-state` can only switch publication on.
    pub fn with_commit_state(mut self, commit_state: bool) -> Self {
        self.commit_state |= commit_state;
        self
    }

    fn read_trigger(&self) -> Result<(TriggerPayload, TriggerSource), TriggerError> {
        // An event document only counts when the platform names its event too.
        let (payload, source) = match (&self.event_path, &self.event_name) {
            (Some(path), Some(name)) => {
                let source = TriggerSource::from_event_name(name)?;
                (TriggerPayload::from_event_file(name, path)?, source)
            }
            _ => (TriggerPayload::default(), TriggerSource::CommandLine),
        };
        Ok((payload.with_overrides(self.overrides.clone()), source))
    }

    pub async fn execute(&self) -> Result<()> {
        let (_, result) = self.run().await;
        result
    }

    /// Run the operation and return how its lifecycle ended alongside the
    /// command result.
    pub async fn run(&self) -> (Option<RunOutcome>, Result<()>) {
        let correlation_id = generate_correlation_id();
        let writer = ArtifactWriter::new(&self.config.artifacts.dir);

        let (payload, source) = match self.read_trigger() {
            Ok(trigger) => trigger,
            Err(e) => {
                println!("❌ Could not read trigger: {e}");
                let requested_id = self.overrides.operation_id.clone().unwrap_or_else(|| "unknown".to_string());
                let requested_command = self.overrides.command.clone().unwrap_or_default();
                let outcome = self
                    .abort(&writer, &requested_id, &requested_command, e.to_string())
                    .await;
                return (outcome, Err(e.into()));
            }
        };

        let raw_operation_id = payload.operation_id.clone().unwrap_or_default();
        let raw_command = payload.command.clone().unwrap_or_default();

        let envelope = match OperationEnvelope::from_payload(
            payload,
            source,
            &self.config.processor.default_command,
        ) {
            Ok(envelope) => envelope,
            Err(e) => {
                println!("❌ {e}");
                let outcome = self
                    .abort(&writer, &raw_operation_id, &raw_command, e.to_string())
                    .await;
                return (outcome, Err(e.into()));
            }
        };

        println!("🔊 EchoNexus operation {}", envelope.operation_id);
        println!("   🧭 Command: {}", envelope.command);
        println!("   👤 Session: {}", envelope.session_id);
        println!();

        let mut lifecycle = RunLifecycle::new(envelope.operation_id.to_string()).state_machine();
        let processor = Processor::new(
            Arc::new(memory_store(&self.config)),
            CommandRegistry::with_builtin_handlers(),
            ArtifactWriter::new(&self.config.artifacts.dir),
        );

        let result = match processor.process(&envelope, &correlation_id).await {
            Ok(report) => {
                lifecycle.handle(&RunEvent::Complete);
                if let Err(e) = self.print_report(&report) {
                    warn!(error = %e, "Failed to print result");
                }

                if self.commit_state {
                    let outcome = self.publish(&envelope);
                    print_publish_outcome(&outcome);
                }

                self.report_status(
                    &writer,
                    envelope.operation_id.as_str(),
                    &envelope.command,
                    lifecycle.inner(),
                    true,
                )
                .await;
                Ok(())
            }
            Err(e) => {
                println!("❌ Processing failed: {e}");
                println!("   Memory was not updated for this operation.");
                lifecycle.handle(&RunEvent::Fail {
                    reason: e.to_string(),
                });
                self.report_status(
                    &writer,
                    envelope.operation_id.as_str(),
                    &envelope.command,
                    lifecycle.inner(),
                    false,
                )
                .await;
                Err(e.into())
            }
        };

        (lifecycle.inner().outcome().cloned(), result)
    }

    /// Record a run that could not start, e.g. because the configuration
    /// failed to load. Only the CLI overrides are known at this point.
    pub async fn report_startup_failure(&self, error: &anyhow::Error) -> Option<RunOutcome> {
        println!("❌ {error:#}");
        let writer = ArtifactWriter::new(&self.config.artifacts.dir);
        let requested_id = self.overrides.operation_id.clone().unwrap_or_else(|| "unknown".to_string());
        let requested_command = self.overrides.command.clone().unwrap_or_default();
        self.abort(&writer, &requested_id, &requested_command, format!("{error:#}"))
            .await
    }

    async fn abort(
        &self,
        writer: &ArtifactWriter,
        operation_id: &str,
        command: &str,
        reason: String,
    ) -> Option<RunOutcome> {
        let mut lifecycle = RunLifecycle::new(operation_id).state_machine();
        lifecycle.handle(&RunEvent::Abort { reason });
        self.report_status(writer, operation_id, command, lifecycle.inner(), false)
            .await;
        lifecycle.inner().outcome().cloned()
    }

    fn print_report(&self, report: &ProcessReport) -> Result<()> {
        match report.resolution {
            Resolution::Registered(handler) => println!("✅ Handled by {handler}"),
            Resolution::Fallback => println!("✅ No dedicated handler, inputs echoed back"),
        }
        println!(
            "   🧠 Memory: {} entr{}{}",
            report.memory_entries,
            if report.memory_entries == 1 { "y" } else { "ies" },
            if report.replaced_entry { " (entry replaced)" } else { "" }
        );
        println!("   📦 Result: {}", report.result_path.display());
        println!();
        println!("{}", serde_json::to_string_pretty(&report.result)?);
        Ok(())
    }

    fn publish(&self, envelope: &OperationEnvelope) -> PublishOutcome {
        let memory_path = match absolute(&self.config.memory.path) {
            Ok(path) => path,
            Err(e) => {
                return PublishOutcome::Failed {
                    reason: format!("{e:#}"),
                }
            }
        };

        let ops = match Git2Operations::discover(&memory_path) {
            Ok(ops) => ops
                .with_author(&self.config.git.author_name, &self.config.git.author_email)
                .with_token(self.config.credentials.github_token.clone()),
            Err(e) => {
                warn!(error = %e, "No repository to publish memory into");
                return PublishOutcome::Failed {
                    reason: format!("{e:#}"),
                };
            }
        };

        let message = format!(
            "EchoNexus memory update: {} ({})",
            envelope.operation_id, envelope.command
        );
        publish_state(&ops, &[memory_path], &self.config.git, &message)
    }

    /// Best effort: a status that cannot be written is logged, never fatal.
    async fn report_status(
        &self,
        writer: &ArtifactWriter,
        operation_id: &str,
        command: &str,
        lifecycle: &RunLifecycle,
        artifacts_available: bool,
    ) {
        let report = StatusReport {
            operation_id: operation_id.to_string(),
            command: command.to_string(),
            status: lifecycle.job_status(),
            completed_at: chrono::Utc::now().to_rfc3339(),
            artifacts_available,
            processor_repo: self.config.processor.repo_name().to_string(),
        };

        if !artifacts_available {
            if let Err(e) = writer.discard_result().await {
                warn!(error = %e, "Failed to remove stale result artifact");
            }
        }

        match writer.write_status(&report).await {
            Ok(path) => println!("📋 Status {} written to {}", report.status, path.display()),
            Err(e) => warn!(error = %e, "Failed to write status report"),
        }
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    Ok(cwd.join(path))
}

fn print_publish_outcome(outcome: &PublishOutcome) {
    match outcome {
        PublishOutcome::Committed {
            commit,
            pushed,
            push_error,
        } => {
            println!("💾 Memory committed: {}", commit.id);
            if *pushed {
                println!("   🚀 Pushed to remote");
            } else if let Some(error) = push_error {
                println!("   ⚠️  Push failed (continuing): {error}");
            }
        }
        PublishOutcome::NothingToCommit => println!("💾 Memory unchanged, nothing to commit"),
        PublishOutcome::Failed { reason } => {
            println!("⚠️  Could not commit memory (continuing): {reason}")
        }
    }
}
