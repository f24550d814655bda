//! Agent output parser
//!
//! Two-stage pipeline: extract the markdown-fenced block from the
//! completion, then decode the `{action, action_input}` payload. Anything
//! malformed raises a typed `OutputParse` error so the caller can reprompt.

use crate::error::{Result, UstaadError};

/// One parsed agent step.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentStep {
    FinalAnswer(String),
    ToolInvocation { tool: String, input: String },
}

/// Extract the text between the first fence open marker and the last fence
/// close marker. Prefers a ```json opener; falls back to a bare ``` opener.
/// Trailing prose after the final closing fence is ignored. Text without
/// fences is returned as-is so bare JSON still parses.
fn extract_fenced_block(text: &str) -> &str {
    let mut block = text.trim();

    if let Some(idx) = block.find("```json") {
        block = block[idx + 7..].trim_start();
    } else if let Some(idx) = block.find("```") {
        block = block[idx + 3..].trim_start();
    }

    if let Some(idx) = block.rfind("```") {
        block = block[..idx].trim_end();
    }

    block
}

/// Parse one LLM completion into an agent step.
pub fn parse(text: &str) -> Result<AgentStep> {
    let block = extract_fenced_block(text);

    let value: serde_json::Value = serde_json::from_str(block).map_err(|e| {
        UstaadError::OutputParse(format!("Failed to parse. Text: {:?}. Error: {}", text, e))
    })?;

    let action = value
        .get("action")
        .and_then(|v| v.as_str())
        .ok_or_else(|| {
            UstaadError::OutputParse(format!("Missing \"action\" field. Text: {:?}", text))
        })?;

    let input = match value.get("action_input") {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    };

    if action == "Final Answer" {
        Ok(AgentStep::FinalAnswer(input))
    } else {
        Ok(AgentStep::ToolInvocation { tool: action.to_string(), input })
    }
}
