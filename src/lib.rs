// EchoNexus Library - single-operation command processor
// This exposes the core components for testing and integration

pub mod artifacts;
pub mod cli;
pub mod config;
pub mod envelope;
pub mod fs;
pub mod git;
pub mod handlers;
pub mod lifecycle;
pub mod memory;
pub mod processor;
pub mod telemetry;

// Re-export key types for easy access
pub use artifacts::{ArtifactWriter, JobStatus, ResultArtifact, StatusReport};
pub use config::EchoNexusConfig;
pub use envelope::{normalize_inputs, OperationEnvelope, OperationId, TriggerPayload, TriggerSource};
pub use git::{publish_state, Git2Operations, GitOperations, PublishOutcome};
pub use handlers::{CommandHandler, CommandRegistry, HandlerError, Resolution};
pub use lifecycle::{RunEvent, RunLifecycle, RunOutcome};
pub use memory::{FileMemoryStore, Memory, MemoryEntry, MemoryLoad, MemoryStore};
pub use processor::{ProcessError, ProcessReport, Processor};
pub use telemetry::{create_operation_span, generate_correlation_id, init_telemetry};
