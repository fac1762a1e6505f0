use serde::Serialize;
use serde_json::Value;

use super::{CommandHandler, HandlerContext, HandlerError};

pub const TEXT_ANALYSIS: &str = "text_analysis";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextAnalysis {
    pub analysis: String,
    pub word_count: usize,
    pub sentiment: String,
}

impl TextAnalysis {
    pub fn of(text: &str) -> Self {
        Self {
            analysis: format!("Analyzed {} characters", text.chars().count()),
            word_count: text.split_whitespace().count(),
            sentiment: "neutral".to_string(),
        }
    }
}

/// Character and word counts over `inputs.text`.
pub struct TextAnalysisHandler;

impl CommandHandler for TextAnalysisHandler {
    fn name(&self) -> &'static str {
        TEXT_ANALYSIS
    }

    fn handle(&self, ctx: &HandlerContext<'_>) -> Result<Value, HandlerError> {
        let text = ctx.string_field("text", "")?;
        ctx.encode(&TextAnalysis::of(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Memory;
    use serde_json::json;

    fn run(inputs: Value) -> Result<Value, HandlerError> {
        let memory = Memory::new();
        TextAnalysisHandler.handle(&HandlerContext {
            command: TEXT_ANALYSIS,
            inputs: &inputs,
            memory: &memory,
        })
    }

    #[test]
    fn test_hello_world() {
        assert_eq!(
            run(json!({"text": "hello world"})).unwrap(),
            json!({
                "analysis": "Analyzed 11 characters",
                "word_count": 2,
                "sentiment": "neutral"
            })
        );
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        let result = TextAnalysis::of("héllo  wörld\n");
        assert_eq!(result.analysis, "Analyzed 13 characters");
        assert_eq!(result.word_count, 2);
    }

    #[test]
    fn test_missing_text_is_empty() {
        assert_eq!(
            run(json!({})).unwrap(),
            json!({
                "analysis": "Analyzed 0 characters",
                "word_count": 0,
                "sentiment": "neutral"
            })
        );
    }

    #[test]
    fn test_non_object_inputs_fail() {
        assert!(matches!(
            run(json!([1, 2])),
            Err(HandlerError::InputsNotObject { found: "array", .. })
        ));
    }

    #[test]
    fn test_non_string_text_fails() {
        assert!(matches!(
            run(json!({"text": 42})),
            Err(HandlerError::InvalidField { .. })
        ));
    }
}
