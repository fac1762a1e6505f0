use serde::Deserialize;
use serde_json::{json, Value};

/// Turn the raw `inputs` string of a trigger into a JSON value.
///
/// Valid JSON is returned as parsed. Anything else is wrapped as
/// `{"text": raw}`; malformed input never fails the run here. An empty string
/// means no inputs were given and becomes `{}`. Whitespace is text like any
/// other non-JSON input.
pub fn normalize_inputs(raw: &str) -> Value {
    if raw.is_empty() {
        return json!({});
    }

    match serde_json::from_str::<Value>(raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(error = %e, "Inputs are not JSON, wrapping as text");
            json!({ "text": raw })
        }
    }
}

/// Inputs as they arrive in a trigger payload.
///
/// Manual dispatch forms only carry strings, while automated dispatch
/// payloads may already contain structured JSON.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawInputs {
    Encoded(String),
    Structured(Value),
}

impl RawInputs {
    pub fn into_value(self) -> Value {
        match self {
            RawInputs::Encoded(raw) => normalize_inputs(&raw),
            RawInputs::Structured(value) => value,
        }
    }
}
