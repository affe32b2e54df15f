//! Tool registry.
//!
//! Immutable after construction; shared behind an `Arc` by the conversation
//! loop. Invocation validates arguments against the tool's declared schema
//! before executing, so tools can trust their required fields exist.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{OrbitError, Result};
use crate::providers::ToolDeclaration;

use super::types::Tool;

#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    by_name: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Re-registering a name replaces the earlier entry.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        if let Some(&idx) = self.by_name.get(&name) {
            warn!(tool = %name, "replacing registered tool");
            self.tools[idx] = tool;
        } else {
            self.by_name.insert(name, self.tools.len());
            self.tools.push(tool);
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Declarations in registration order, as advertised to the model.
    pub fn declarations(&self) -> Vec<ToolDeclaration> {
        self.tools.iter().map(|t| t.declaration()).collect()
    }

    /// Validate arguments and run the named tool.
    ///
    /// Unknown names and schema violations surface as `UnknownTool` and
    /// `InvalidArguments` so the caller can feed them back to the model
    /// instead of aborting the exchange.
    pub async fn invoke(&self, name: &str, args: Value) -> Result<Value> {
        let tool = self
            .by_name
            .get(name)
            .map(|&idx| &self.tools[idx])
            .ok_or_else(|| OrbitError::UnknownTool(name.to_string()))?;

        validate_arguments(name, &tool.parameters(), &args)?;
        debug!(tool = %name, "invoking tool");
        tool.execute(args).await
    }
}

/// Check `args` against the tool's JSON Schema: required fields present,
/// declared property types respected. Unknown properties pass through.
fn validate_arguments(tool: &str, schema: &Value, args: &Value) -> Result<()> {
    let obj = args.as_object().ok_or_else(|| OrbitError::InvalidArguments {
        tool: tool.to_string(),
        reason: "arguments must be a JSON object".to_string(),
    })?;

    if let Some(required) = schema["required"].as_array() {
        for field in required.iter().filter_map(Value::as_str) {
            if !obj.contains_key(field) || obj[field].is_null() {
                return Err(OrbitError::InvalidArguments {
                    tool: tool.to_string(),
                    reason: format!("missing required field '{field}'"),
                });
            }
        }
    }

    if let Some(properties) = schema["properties"].as_object() {
        for (field, prop) in properties {
            let Some(value) = obj.get(field) else { continue };
            if value.is_null() {
                continue;
            }
            let expected = prop["type"].as_str().unwrap_or("");
            let ok = match expected {
                "string" => value.is_string(),
                "number" => value.is_number(),
                "integer" => value.is_i64() || value.is_u64(),
                "boolean" => value.is_boolean(),
                "array" => value.is_array(),
                "object" => value.is_object(),
                _ => true,
            };
            if !ok {
                return Err(OrbitError::InvalidArguments {
                    tool: tool.to_string(),
                    reason: format!("field '{field}' must be of type {expected}"),
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echo the input text"
        }

        fn parameters(&self) -> Value {
            json!({
                "type": "object",
                "properties": {
                    "text": {"type": "string"},
                    "times": {"type": "integer"}
                },
                "required": ["text"]
            })
        }

        async fn execute(&self, args: Value) -> Result<Value> {
            Ok(json!({"echo": args["text"]}))
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool));
        registry
    }

    #[tokio::test]
    async fn test_invoke_known_tool() {
        let result = registry().invoke("echo", json!({"text": "hi"})).await.unwrap();
        assert_eq!(result["echo"], "hi");
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let err = registry().invoke("nope", json!({})).await.unwrap_err();
        assert!(matches!(err, OrbitError::UnknownTool(name) if name == "nope"));
    }

    #[tokio::test]
    async fn test_missing_required_field() {
        let err = registry().invoke("echo", json!({})).await.unwrap_err();
        match err {
            OrbitError::InvalidArguments { tool, reason } => {
                assert_eq!(tool, "echo");
                assert!(reason.contains("text"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_wrong_field_type() {
        let err = registry()
            .invoke("echo", json!({"text": "hi", "times": "three"}))
            .await
            .unwrap_err();
        assert!(matches!(err, OrbitError::InvalidArguments { .. }));
    }

    #[tokio::test]
    async fn test_null_optional_field_passes() {
        let result = registry()
            .invoke("echo", json!({"text": "hi", "times": null}))
            .await;
        assert!(result.is_ok());
    }

    #[test]
    fn test_declarations_in_registration_order() {
        let registry = registry();
        let decls = registry.declarations();
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].name, "echo");
        assert!(registry.has("echo"));
        assert_eq!(registry.names(), vec!["echo"]);
    }
}
