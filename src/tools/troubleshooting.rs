//! Troubleshooting steps tool.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::catalog::Catalog;
use crate::error::Result;

use super::types::Tool;

/// Fold free-form product names onto the KB's keys.
fn normalize_product_type(product_type: &str) -> String {
    let pt = product_type.to_lowercase();
    let pt = pt.trim();
    if pt.contains("laptop") {
        return "laptop".to_string();
    }
    if pt.contains("headphone") {
        return "headphones".to_string();
    }
    if pt.contains("phone") || pt.contains("mobile") {
        return "phone".to_string();
    }
    // Generic "device" complaints read like laptop issues in practice.
    if pt.contains("device") {
        return "laptop".to_string();
    }
    pt.to_string()
}

/// Fold an issue description onto a KB issue key.
fn normalize_issue(issue: &str) -> String {
    let text = issue.to_lowercase();
    if text.contains("not turning on")
        || text.contains("won't turn on")
        || text.contains("does not turn on")
        || text.contains("won't power on")
    {
        return "not_turning_on".to_string();
    }
    if text.contains("no sound") || text.contains("cannot hear") || text.contains("no audio") {
        return "no_sound".to_string();
    }
    if text.contains("overheating") || text.contains("too hot") {
        return "overheating".to_string();
    }
    text.replace(' ', "_")
}

pub struct TroubleshootingTool {
    catalog: Arc<Catalog>,
}

impl TroubleshootingTool {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }
}

#[async_trait]
impl Tool for TroubleshootingTool {
    fn name(&self) -> &str {
        "get_troubleshooting_steps"
    }

    fn description(&self) -> &str {
        "Get troubleshooting steps for common device issues."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "product_type": {
                    "type": "string",
                    "description": "Type of product: laptop, headphones, mouse, keyboard"
                },
                "issue": {
                    "type": "string",
                    "description": "Description of the issue the user is facing"
                }
            },
            "required": ["product_type", "issue"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let raw_product = args["product_type"].as_str().unwrap_or_default();
        let raw_issue = args["issue"].as_str().unwrap_or_default();

        let product_type = normalize_product_type(raw_product);
        let issue_key = normalize_issue(raw_issue);

        let Some(steps) = self.catalog.troubleshooting_steps(&product_type, &issue_key) else {
            return Ok(json!({
                "found": false,
                "product_type": product_type,
                "issue_key": issue_key,
                "steps": [],
                "message": format!(
                    "No troubleshooting steps found for issue '{issue_key}' on '{product_type}'."
                ),
            }));
        };

        let mut lines = vec![format!(
            "Here are some troubleshooting steps for your {product_type} ({raw_issue}):"
        )];
        for (i, step) in steps.iter().enumerate() {
            lines.push(format!("{}. {step}", i + 1));
        }

        Ok(json!({
            "found": true,
            "product_type": product_type,
            "issue_key": issue_key,
            "steps": steps,
            "message": lines.join("\n"),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool() -> TroubleshootingTool {
        TroubleshootingTool::new(Arc::new(Catalog::demo()))
    }

    #[tokio::test]
    async fn test_known_issue() {
        let result = tool()
            .execute(json!({"product_type": "my laptop", "issue": "it won't turn on"}))
            .await
            .unwrap();
        assert_eq!(result["found"], true);
        assert_eq!(result["product_type"], "laptop");
        assert_eq!(result["issue_key"], "not_turning_on");
        assert!(result["message"].as_str().unwrap().contains("1."));
    }

    #[tokio::test]
    async fn test_headphones_no_sound() {
        let result = tool()
            .execute(json!({"product_type": "headphones", "issue": "no audio at all"}))
            .await
            .unwrap();
        assert_eq!(result["found"], true);
        assert_eq!(result["issue_key"], "no_sound");
    }

    #[tokio::test]
    async fn test_unknown_issue() {
        let result = tool()
            .execute(json!({"product_type": "laptop", "issue": "screen flickers"}))
            .await
            .unwrap();
        assert_eq!(result["found"], false);
        assert_eq!(result["issue_key"], "screen_flickers");
        assert!(result["steps"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_normalize_product_type() {
        assert_eq!(normalize_product_type("Laptop"), "laptop");
        assert_eq!(normalize_product_type("my headphone set"), "headphones");
        assert_eq!(normalize_product_type("mobile"), "phone");
        assert_eq!(normalize_product_type("device"), "laptop");
        assert_eq!(normalize_product_type("keyboard"), "keyboard");
    }
}
