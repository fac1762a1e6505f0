use serde::Serialize;
use serde_json::Value;

use super::{CommandHandler, HandlerContext, HandlerError};

pub const DIAGNOSTIC_SCAN: &str = "diagnostic_scan";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiagnosticReport {
    pub status: &'static str,
    pub checks: Vec<&'static str>,
    pub issues: Vec<String>,
}

/// Static health report. Inputs are ignored.
pub struct DiagnosticScanHandler;

impl CommandHandler for DiagnosticScanHandler {
    fn name(&self) -> &'static str {
        DIAGNOSTIC_SCAN
    }

    fn handle(&self, ctx: &HandlerContext<'_>) -> Result<Value, HandlerError> {
        ctx.encode(&DiagnosticReport {
            status: "healthy",
            checks: vec!["memory", "disk", "network"],
            issues: Vec::new(),
        })
    }
}
