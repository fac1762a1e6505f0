//! Operation envelope
//!
//! Normalizes both invocation shapes (automated `repository_dispatch` payloads
//! and manual `workflow_dispatch` forms) into one [`OperationEnvelope`].
//! The operation id is the only validated field.

pub mod inputs;
pub mod operation_id;
pub mod trigger;

pub use inputs::{normalize_inputs, RawInputs};
pub use operation_id::OperationId;
pub use trigger::{SecurityContext, TriggerError, TriggerOverrides, TriggerPayload, TriggerSource};

use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

pub const DEFAULT_SESSION_ID: &str = "manual";

#[derive(Debug, Error)]
pub enum EnvelopeError {
    #[error("Invalid operation ID format: '{candidate}' (expected echo-<digits>-<16 hex chars>)")]
    InvalidOperationId { candidate: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationEnvelope {
    pub operation_id: OperationId,
    pub command: String,
    pub inputs: Value,
    pub session_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_hash: Option<String>,
    pub source: TriggerSource,
}

impl OperationEnvelope {
    /// Build the envelope from a trigger payload.
    ///
    /// A supplied operation id must pass the format check; an absent one is
    /// generated. `command` falls back to `default_command`, `session_id` to
    /// `"manual"`, and absent inputs to `{}`.
    pub fn from_payload(
        payload: TriggerPayload,
        source: TriggerSource,
        default_command: &str,
    ) -> Result<Self, EnvelopeError> {
        let auth_hash = payload.auth_hash().map(str::to_string);

        // Manual dispatch forms send an empty string for a field left blank.
        let operation_id = match payload.operation_id.as_deref().filter(|id| !id.is_empty()) {
            Some(candidate) => OperationId::parse(candidate)?,
            None => {
                let generated = OperationId::generate();
                tracing::info!(operation_id = %generated, "No operation ID supplied, generated one");
                generated
            }
        };

        let command = payload
            .command
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| default_command.to_string());

        let inputs = payload
            .inputs
            .map(RawInputs::into_value)
            .unwrap_or_else(|| json!({}));

        let session_id = payload
            .session_id
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SESSION_ID.to_string());

        Ok(Self {
            operation_id,
            command,
            inputs,
            session_id,
            auth_hash,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_applied() {
        let payload = TriggerPayload {
            operation_id: Some("echo-1699999999-abc0123456789def".to_string()),
            ..Default::default()
        };

        let envelope =
            OperationEnvelope::from_payload(payload, TriggerSource::CommandLine, "text_analysis")
                .unwrap();
        assert_eq!(envelope.operation_id.as_str(), "echo-1699999999-abc0123456789def");
        assert_eq!(envelope.command, "text_analysis");
        assert_eq!(envelope.session_id, "manual");
        assert_eq!(envelope.inputs, json!({}));
        assert_eq!(envelope.auth_hash, None);
    }

    #[test]
    fn test_invalid_id_rejected() {
        let payload = TriggerPayload {
            operation_id: Some("echo-123-xyz".to_string()),
            command: Some("diagnostic_scan".to_string()),
            ..Default::default()
        };

        let err = OperationEnvelope::from_payload(payload, TriggerSource::WorkflowDispatch, "text_analysis")
            .unwrap_err();
        assert!(matches!(err, EnvelopeError::InvalidOperationId { .. }));
    }

    #[test]
    fn test_missing_id_is_generated() {
        let envelope = OperationEnvelope::from_payload(
            TriggerPayload::default(),
            TriggerSource::RepositoryDispatch,
            "text_analysis",
        )
        .unwrap();
        assert!(OperationId::parse(envelope.operation_id.as_str()).is_ok());
    }

    #[test]
    fn test_blank_form_id_is_generated() {
        let payload = TriggerPayload {
            operation_id: Some(String::new()),
            command: Some("diagnostic_scan".to_string()),
            ..Default::default()
        };

        let envelope =
            OperationEnvelope::from_payload(payload, TriggerSource::WorkflowDispatch, "text_analysis")
                .unwrap();
        assert!(envelope.operation_id.as_str().starts_with("echo-"));
        assert_eq!(envelope.command, "diagnostic_scan");
    }

    #[test]
    fn test_whitespace_id_still_rejected() {
        let payload = TriggerPayload {
            operation_id: Some(" ".to_string()),
            ..Default::default()
        };

        assert!(
            OperationEnvelope::from_payload(payload, TriggerSource::WorkflowDispatch, "text_analysis")
                .is_err()
        );
    }

    #[test]
    fn test_command_and_inputs_accepted_as_is() {
        let payload = TriggerPayload {
            operation_id: Some("echo-5-ffffffffffffffff".to_string()),
            command: Some("  Weird Command!  ".to_string()),
            inputs: Some(RawInputs::Encoded("free text".to_string())),
            session_id: Some("abc".to_string()),
            security_context: Some(SecurityContext {
                auth_hash: Some("deadbeef".to_string()),
            }),
        };

        let envelope =
            OperationEnvelope::from_payload(payload, TriggerSource::RepositoryDispatch, "text_analysis")
                .unwrap();
        assert_eq!(envelope.command, "  Weird Command!  ");
        assert_eq!(envelope.inputs, json!({"text": "free text"}));
        assert_eq!(envelope.session_id, "abc");
        assert_eq!(envelope.auth_hash.as_deref(), Some("deadbeef"));
    }
}
