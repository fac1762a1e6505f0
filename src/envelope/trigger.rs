use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use thiserror::Error;

use super::inputs::RawInputs;

#[derive(Debug, Error)]
pub enum TriggerError {
    #[error("Unsupported trigger event '{0}' (expected repository_dispatch or workflow_dispatch)")]
    UnsupportedEvent(String),

    #[error("Failed to read event file {path}: {source}")]
    EventFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed trigger payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
}

/// Which of the two invocation shapes produced a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerSource {
    RepositoryDispatch,
    WorkflowDispatch,
    CommandLine,
}

impl TriggerSource {
    pub fn from_event_name(event_name: &str) -> Result<Self, TriggerError> {
        match event_name {
            "repository_dispatch" => Ok(TriggerSource::RepositoryDispatch),
            "workflow_dispatch" => Ok(TriggerSource::WorkflowDispatch),
            other => Err(TriggerError::UnsupportedEvent(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityContext {
    #[serde(default)]
    pub auth_hash: Option<String>,
}

/// Fields shared by both trigger shapes, all optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TriggerPayload {
    #[serde(default)]
    pub operation_id: Option<String>,
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub inputs: Option<RawInputs>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub security_context: Option<SecurityContext>,
}

/// Values given explicitly on the command line.
#[derive(Debug, Clone, Default)]
pub struct TriggerOverrides {
    pub operation_id: Option<String>,
    pub command: Option<String>,
    pub inputs: Option<String>,
    pub session_id: Option<String>,
}

impl TriggerPayload {
    /// Extract the payload from a platform event document.
    ///
    /// `repository_dispatch` carries it in `client_payload`, `workflow_dispatch`
    /// in `inputs`. A missing object gives an empty payload.
    pub fn from_event(event_name: &str, event: &Value) -> Result<Self, TriggerError> {
        let source = TriggerSource::from_event_name(event_name)?;
        let section = match source {
            TriggerSource::RepositoryDispatch => event.get("client_payload"),
            TriggerSource::WorkflowDispatch => event.get("inputs"),
            TriggerSource::CommandLine => None,
        };

        match section {
            Some(Value::Null) | None => Ok(Self::default()),
            Some(value) => Ok(serde_json::from_value(value.clone())?),
        }
    }

    pub fn from_event_file(event_name: &str, path: &Path) -> Result<Self, TriggerError> {
        let content = std::fs::read_to_string(path).map_err(|source| TriggerError::EventFile {
            path: path.display().to_string(),
            source,
        })?;
        let event: Value = serde_json::from_str(&content)?;
        Self::from_event(event_name, &event)
    }

    /// Explicit values win over whatever the event carried.
    pub fn with_overrides(mut self, overrides: TriggerOverrides) -> Self {
        if let Some(operation_id) = overrides.operation_id {
            self.operation_id = Some(operation_id);
        }
        if let Some(command) = overrides.command {
            self.command = Some(command);
        }
        if let Some(inputs) = overrides.inputs {
            self.inputs = Some(RawInputs::Encoded(inputs));
        }
        if let Some(session_id) = overrides.session_id {
            self.session_id = Some(session_id);
        }
        self
    }

    pub fn auth_hash(&self) -> Option<&str> {
        self.security_context
            .as_ref()
            .and_then(|ctx| ctx.auth_hash.as_deref())
    }
}
