//! Command handlers
//!
//! A command string selects one handler by exact match from a
//! [`CommandRegistry`]. Unknown commands go to the registry's fallback
//! handler, so dispatch always produces a result unless a handler itself
//! fails on inputs it cannot use.

pub mod code_generation;
pub mod diagnostic_scan;
pub mod fallback;
pub mod text_analysis;
pub mod workflow_synthesis;

pub use code_generation::CodeGenerationHandler;
pub use diagnostic_scan::DiagnosticScanHandler;
pub use fallback::EchoFallbackHandler;
pub use text_analysis::TextAnalysisHandler;
pub use workflow_synthesis::WorkflowSynthesisHandler;

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

use crate::memory::Memory;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("{command}: expected inputs to be a JSON object, got {found}")]
    InputsNotObject { command: String, found: &'static str },

    #[error("{command}: field '{field}' must be a string, got {found}")]
    InvalidField {
        command: String,
        field: String,
        found: &'static str,
    },

    #[error("{command}: failed to encode result: {source}")]
    Encode {
        command: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Handler for command '{0}' is already registered")]
    AlreadyRegistered(String),
}

/// Everything a handler may look at.
///
/// `memory` is the state loaded for this run. None of the built-in handlers
/// read it.
#[derive(Debug, Clone, Copy)]
pub struct HandlerContext<'a> {
    pub command: &'a str,
    pub inputs: &'a Value,
    pub memory: &'a Memory,
}

impl<'a> HandlerContext<'a> {
    /// The inputs as a JSON object, or an error naming what was found instead.
    pub fn object_inputs(&self) -> Result<&'a Map<String, Value>, HandlerError> {
        self.inputs
            .as_object()
            .ok_or_else(|| HandlerError::InputsNotObject {
                command: self.command.to_string(),
                found: json_kind(self.inputs),
            })
    }

    /// A string field of the inputs, with a default when absent or null.
    pub fn string_field(&self, field: &str, default: &str) -> Result<String, HandlerError> {
        match self.object_inputs()?.get(field) {
            None | Some(Value::Null) => Ok(default.to_string()),
            Some(Value::String(s)) => Ok(s.clone()),
            Some(other) => Err(HandlerError::InvalidField {
                command: self.command.to_string(),
                field: field.to_string(),
                found: json_kind(other),
            }),
        }
    }

    pub(crate) fn encode<T: Serialize>(&self, result: &T) -> Result<Value, HandlerError> {
        serde_json::to_value(result).map_err(|source| HandlerError::Encode {
            command: self.command.to_string(),
            source,
        })
    }
}

/// Implementation of one named command
pub trait CommandHandler: Send + Sync {
    /// Command name this handler answers to
    fn name(&self) -> &'static str;

    fn handle(&self, ctx: &HandlerContext<'_>) -> Result<Value, HandlerError>;
}

/// How a command string was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Registered(&'static str),
    Fallback,
}

pub struct CommandRegistry {
    handlers: HashMap<&'static str, Arc<dyn CommandHandler>>,
    fallback: Arc<dyn CommandHandler>,
}

impl CommandRegistry {
    /// Empty registry that sends every command to `fallback`.
    pub fn new(fallback: impl CommandHandler + 'static) -> Self {
        Self {
            handlers: HashMap::new(),
            fallback: Arc::new(fallback),
        }
    }

    /// Registry with the four built-in commands and the echo fallback.
    pub fn with_builtin_handlers() -> Self {
        let mut registry = Self::new(EchoFallbackHandler);
        registry.insert(Arc::new(TextAnalysisHandler));
        registry.insert(Arc::new(CodeGenerationHandler));
        registry.insert(Arc::new(DiagnosticScanHandler));
        registry.insert(Arc::new(WorkflowSynthesisHandler));
        registry
    }

    fn insert(&mut self, handler: Arc<dyn CommandHandler>) {
        self.handlers.insert(handler.name(), handler);
    }

    pub fn register<H: CommandHandler + 'static>(&mut self, handler: H) -> Result<(), RegistryError> {
        let name = handler.name();
        if self.handlers.contains_key(name) {
            return Err(RegistryError::AlreadyRegistered(name.to_string()));
        }
        self.insert(Arc::new(handler));
        Ok(())
    }

    pub fn resolve(&self, command: &str) -> Resolution {
        match self.handlers.get_key_value(command) {
            Some((name, _)) => Resolution::Registered(*name),
            None => Resolution::Fallback,
        }
    }

    /// Run the handler for `command`. Unknown commands never fail here.
    pub fn dispatch(
        &self,
        command: &str,
        inputs: &Value,
        memory: &Memory,
    ) -> Result<Value, HandlerError> {
        let handler = self.handlers.get(command).unwrap_or(&self.fallback);
        let ctx = HandlerContext {
            command,
            inputs,
            memory,
        };

        tracing::debug!(command = %command, handler = handler.name(), "Dispatching command");
        handler.handle(&ctx)
    }

    pub fn registered_commands(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.handlers.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::with_builtin_handlers()
    }
}

pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct StaticHandler(&'static str);

    impl CommandHandler for StaticHandler {
        fn name(&self) -> &'static str {
            self.0
        }

        fn handle(&self, _ctx: &HandlerContext<'_>) -> Result<Value, HandlerError> {
            Ok(json!({ "handled_by": self.0 }))
        }
    }

    #[test]
    fn test_builtin_commands_registered() {
        let registry = CommandRegistry::with_builtin_handlers();
        assert_eq!(
            registry.registered_commands(),
            vec![
                "code_generation",
                "diagnostic_scan",
                "text_analysis",
                "workflow_synthesis"
            ]
        );
    }

    #[test]
    fn test_resolution_is_exact_match() {
        let registry = CommandRegistry::default();
        assert_eq!(registry.resolve("text_analysis"), Resolution::Registered("text_analysis"));
        assert_eq!(registry.resolve("Text_Analysis"), Resolution::Fallback);
        assert_eq!(registry.resolve(" text_analysis"), Resolution::Fallback);
        assert_eq!(registry.resolve(""), Resolution::Fallback);
    }

    #[test]
    fn test_double_registration() {
        let mut registry = CommandRegistry::default();
        let result = registry.register(StaticHandler("diagnostic_scan"));
        assert!(matches!(result, Err(RegistryError::AlreadyRegistered(name)) if name == "diagnostic_scan"));
    }

    #[test]
    fn test_custom_handler_and_fallback() {
        let mut registry = CommandRegistry::new(StaticHandler("fallback"));
        registry.register(StaticHandler("custom")).unwrap();
        let memory = Memory::new();

        let custom = registry.dispatch("custom", &json!({}), &memory).unwrap();
        let other = registry.dispatch("other", &json!({}), &memory).unwrap();

        assert_eq!(custom, json!({"handled_by": "custom"}));
        assert_eq!(other, json!({"handled_by": "fallback"}));
    }

    #[test]
    fn test_string_field_rules() {
        let memory = Memory::new();
        let inputs = json!({"name": "x", "count": 3, "empty": null});
        let ctx = HandlerContext {
            command: "probe",
            inputs: &inputs,
            memory: &memory,
        };

        assert_eq!(ctx.string_field("name", "d").unwrap(), "x");
        assert_eq!(ctx.string_field("missing", "d").unwrap(), "d");
        assert_eq!(ctx.string_field("empty", "d").unwrap(), "d");
        assert!(matches!(
            ctx.string_field("count", "d"),
            Err(HandlerError::InvalidField { found: "number", .. })
        ));
    }
}
