//! Gemini function-calling client.

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{OrbitError, Result};

use super::{ModelClient, ModelTurn, ToolDeclaration, TranscriptEntry};

pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    api_base: String,
}

impl GeminiClient {
    pub fn new(api_key: &str, model: &str, api_base: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base, self.model
        )
    }

    fn build_request(
        &self,
        system_prompt: &str,
        tools: &[ToolDeclaration],
        transcript: &[TranscriptEntry],
    ) -> Value {
        let contents: Vec<Value> = transcript.iter().map(to_content).collect();
        let mut body = json!({
            "system_instruction": {"parts": [{"text": system_prompt}]},
            "contents": contents,
        });
        if !tools.is_empty() {
            let declarations: Vec<Value> = tools
                .iter()
                .map(|t| {
                    json!({
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.parameters,
                    })
                })
                .collect();
            body["tools"] = json!([{"function_declarations": declarations}]);
        }
        body
    }
}

/// Map one transcript entry to a Gemini `contents` element. Tool calls are
/// replayed as model-authored functionCall parts, tool results as
/// user-authored functionResponse parts.
fn to_content(entry: &TranscriptEntry) -> Value {
    match entry {
        TranscriptEntry::Message { role, content } => {
            let wire_role = if role == "assistant" { "model" } else { "user" };
            json!({"role": wire_role, "parts": [{"text": content}]})
        }
        TranscriptEntry::ToolCall { name, arguments } => json!({
            "role": "model",
            "parts": [{"functionCall": {"name": name, "args": arguments}}],
        }),
        TranscriptEntry::ToolResult { name, result } => json!({
            "role": "user",
            "parts": [{"functionResponse": {"name": name, "response": {"result": result}}}],
        }),
    }
}

/// Pull the model's decision out of a generateContent response. A
/// functionCall part wins over text; multiple text parts are concatenated.
fn parse_response(body: &Value) -> Result<ModelTurn> {
    let parts = body["candidates"][0]["content"]["parts"]
        .as_array()
        .ok_or_else(|| {
            OrbitError::Provider(format!(
                "malformed response: no candidate parts ({})",
                body["error"]["message"].as_str().unwrap_or("unknown")
            ))
        })?;

    for part in parts {
        if let Some(call) = part.get("functionCall") {
            let name = call["name"]
                .as_str()
                .ok_or_else(|| OrbitError::Provider("functionCall without a name".to_string()))?
                .to_string();
            let arguments = call.get("args").cloned().unwrap_or_else(|| json!({}));
            return Ok(ModelTurn::ToolRequest { name, arguments });
        }
    }

    let text: String = parts
        .iter()
        .filter_map(|p| p["text"].as_str())
        .collect::<Vec<_>>()
        .join("");
    if text.is_empty() {
        return Err(OrbitError::Provider(
            "response contained neither text nor a function call".to_string(),
        ));
    }
    Ok(ModelTurn::FinalAnswer(text))
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn converse(
        &self,
        system_prompt: &str,
        tools: &[ToolDeclaration],
        transcript: &[TranscriptEntry],
    ) -> Result<ModelTurn> {
        let body = self.build_request(system_prompt, tools, transcript);
        debug!(model = %self.model, entries = transcript.len(), tools = tools.len(), "gemini request");

        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let payload: Value = response.json().await?;
        if !status.is_success() {
            let message = payload["error"]["message"]
                .as_str()
                .unwrap_or("unknown error");
            return Err(OrbitError::Provider(format!(
                "gemini returned {status}: {message}"
            )));
        }
        parse_response(&payload)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
