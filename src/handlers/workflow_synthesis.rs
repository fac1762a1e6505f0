use serde::Serialize;
use serde_json::Value;

use super::{CommandHandler, HandlerContext, HandlerError};

pub const WORKFLOW_SYNTHESIS: &str = "workflow_synthesis";

const STEPS: [&str; 4] = ["validate", "process", "persist", "report"];
const TRIGGERS: [&str; 2] = ["repository_dispatch", "workflow_dispatch"];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SynthesizedWorkflow {
    pub workflow: String,
    pub steps: Vec<&'static str>,
    pub triggers: Vec<&'static str>,
}

/// Static workflow outline labelled with `inputs.goal`.
pub struct WorkflowSynthesisHandler;

impl CommandHandler for WorkflowSynthesisHandler {
    fn name(&self) -> &'static str {
        WORKFLOW_SYNTHESIS
    }

    fn handle(&self, ctx: &HandlerContext<'_>) -> Result<Value, HandlerError> {
        let goal = ctx.string_field("goal", "general automation")?;

        ctx.encode(&SynthesizedWorkflow {
            workflow: format!("Synthesized workflow for: {goal}"),
            steps: STEPS.to_vec(),
            triggers: TRIGGERS.to_vec(),
        })
    }
}
