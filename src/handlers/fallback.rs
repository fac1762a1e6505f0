use serde::Serialize;
use serde_json::Value;

use super::{CommandHandler, HandlerContext, HandlerError};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EchoResult<'a> {
    pub status: &'static str,
    pub message: String,
    pub data: &'a Value,
}

/// Answers any command that has no handler by echoing its inputs back.
pub struct EchoFallbackHandler;

impl CommandHandler for EchoFallbackHandler {
    fn name(&self) -> &'static str {
        "echo"
    }

    fn handle(&self, ctx: &HandlerContext<'_>) -> Result<Value, HandlerError> {
        ctx.encode(&EchoResult {
            status: "success",
            message: format!("EchoNexus executed command: {}", ctx.command),
            data: ctx.inputs,
        })
    }
}
