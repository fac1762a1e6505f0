//! Linear processing of one operation: load memory, dispatch, record, save,
//! write the result artifact.

use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn, Instrument};

use crate::artifacts::{ArtifactError, ArtifactWriter, ResultArtifact};
use crate::envelope::OperationEnvelope;
use crate::handlers::{CommandRegistry, HandlerError, Resolution};
use crate::memory::{MemoryEntry, MemoryError, MemoryLoad, MemoryStore};
use crate::telemetry::create_operation_span;

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("Command execution failed: {0}")]
    Handler(#[from] HandlerError),

    #[error("Failed to save memory: {0}")]
    Memory(#[from] MemoryError),

    #[error("Failed to write result artifact: {0}")]
    Artifact(#[from] ArtifactError),
}

/// What a successful run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessReport {
    pub result: Value,
    pub resolution: Resolution,
    /// Whether a store (readable or not) existed before this run
    pub memory_existed: bool,
    /// Whether this run replaced an entry with the same id
    pub replaced_entry: bool,
    pub memory_entries: usize,
    pub result_path: PathBuf,
    pub timestamp: String,
}

pub struct Processor {
    store: Arc<dyn MemoryStore>,
    registry: CommandRegistry,
    artifacts: ArtifactWriter,
}

impl Processor {
    pub fn new(store: Arc<dyn MemoryStore>, registry: CommandRegistry, artifacts: ArtifactWriter) -> Self {
        Self {
            store,
            registry,
            artifacts,
        }
    }

    pub fn artifacts(&self) -> &ArtifactWriter {
        &self.artifacts
    }

    /// Process one validated envelope.
    ///
    /// A handler error stops the run before the memory is saved, so a failed
    /// operation leaves no trace in the store.
    pub async fn process(
        &self,
        envelope: &OperationEnvelope,
        correlation_id: &str,
    ) -> Result<ProcessReport, ProcessError> {
        let span = create_operation_span(
            envelope.operation_id.as_str(),
            &envelope.command,
            &envelope.session_id,
            correlation_id,
        );
        self.process_inner(envelope).instrument(span).await
    }

    async fn process_inner(&self, envelope: &OperationEnvelope) -> Result<ProcessReport, ProcessError> {
        let load = self.store.load().await;
        let memory_existed = load.existed();
        if let MemoryLoad::Unreadable { reason } = &load {
            warn!(store = %self.store.location(), reason = %reason, "Memory unreadable, starting empty");
        }
        let mut memory = load.into_memory();

        let resolution = self.registry.resolve(&envelope.command);
        if resolution == Resolution::Fallback {
            info!(command = %envelope.command, "No handler registered, using echo fallback");
        }

        let result = self
            .registry
            .dispatch(&envelope.command, &envelope.inputs, &memory)?;

        let entry = MemoryEntry::new(envelope.command.clone(), envelope.inputs.clone(), result.clone());
        let timestamp = entry.timestamp.clone();
        let replaced_entry = memory.record(&envelope.operation_id, entry).is_some();
        if replaced_entry {
            info!("Replacing existing memory entry for this operation");
        }
        self.store.save(&memory).await?;

        let result_path = self
            .artifacts
            .write_result(&ResultArtifact {
                operation_id: envelope.operation_id.to_string(),
                command: envelope.command.clone(),
                result: result.clone(),
                timestamp: timestamp.clone(),
            })
            .await?;

        info!(entries = memory.len(), "Operation processed");

        Ok(ProcessReport {
            result,
            resolution,
            memory_existed,
            replaced_entry,
            memory_entries: memory.len(),
            result_path,
            timestamp,
        })
    }
}
