//! Model provider abstraction.
//!
//! The conversation loop only ever sees `ModelClient`: one transcript in, one
//! `ModelTurn` out. Everything provider-specific (wire format, auth, parsing)
//! lives behind the trait.

mod gemini;

pub use gemini::GeminiClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// What the model decided to do with the current transcript. Exactly one of
/// the two, never both.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelTurn {
    /// A complete natural-language answer for the customer.
    FinalAnswer(String),
    /// A request to run one registered tool before answering.
    ToolRequest { name: String, arguments: Value },
}

/// Tool metadata advertised to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDeclaration {
    pub name: String,
    pub description: String,
    /// JSON Schema for the tool's arguments object.
    pub parameters: Value,
}

/// One entry in the transcript sent to the model.
#[derive(Debug, Clone)]
pub enum TranscriptEntry {
    /// A plain user or assistant message. `role` is "user" or "assistant".
    Message { role: String, content: String },
    /// A tool call the model made earlier in this exchange.
    ToolCall { name: String, arguments: Value },
    /// The result (or error payload) produced for an earlier tool call.
    ToolResult { name: String, result: Value },
}

impl TranscriptEntry {
    pub fn user(content: impl Into<String>) -> Self {
        Self::Message {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Message {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// A conversational model that can answer directly or request tool calls.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Run one model exchange over the transcript. Passing an empty `tools`
    /// slice forces a text answer.
    async fn converse(
        &self,
        system_prompt: &str,
        tools: &[ToolDeclaration],
        transcript: &[TranscriptEntry],
    ) -> Result<ModelTurn>;

    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_transcript_entry_helpers() {
        match TranscriptEntry::user("hi") {
            TranscriptEntry::Message { role, content } => {
                assert_eq!(role, "user");
                assert_eq!(content, "hi");
            }
            _ => panic!("expected message"),
        }
    }

    #[test]
    fn test_tool_declaration_serializes_schema() {
        let decl = ToolDeclaration {
            name: "get_order_status".to_string(),
            description: "Look up an order".to_string(),
            parameters: json!({
                "type": "object",
                "properties": {"order_id": {"type": "string"}},
                "required": ["order_id"]
            }),
        };
        let json = serde_json::to_value(&decl).unwrap();
        assert_eq!(json["parameters"]["required"][0], "order_id");
    }
}
