use serde::Serialize;
use serde_json::Value;

use super::{CommandHandler, HandlerContext, HandlerError};

pub const CODE_GENERATION: &str = "code_generation";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedCode {
    pub code: String,
    pub language: String,
    pub status: &'static str,
}

/// Template snippet built from `inputs.prompt` and `inputs.language`.
pub struct CodeGenerationHandler;

impl CommandHandler for CodeGenerationHandler {
    fn name(&self) -> &'static str {
        CODE_GENERATION
    }

    fn handle(&self, ctx: &HandlerContext<'_>) -> Result<Value, HandlerError> {
        let prompt = ctx.string_field("prompt", "unspecified task")?;
        let language = ctx.string_field("language", "python")?;

        let code = format!(
            "# Generated by EchoNexus ({language})\n# Task: {prompt}\n\ndef main():\n    print(\"EchoNexus: {prompt}\")\n"
        );

        ctx.encode(&GeneratedCode {
            code,
            language,
            status: "generated",
        })
    }
}
