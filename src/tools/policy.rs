//! Policy document search tool. Delegates to the retrieval chain so policy
//! answers are grounded in the indexed documents.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::Result;
use crate::rag::RagService;

use super::types::Tool;

const TOP_K: usize = 3;

pub struct PolicySearchTool {
    rag: Arc<RagService>,
}

impl PolicySearchTool {
    pub fn new(rag: Arc<RagService>) -> Self {
        Self { rag }
    }
}

#[async_trait]
impl Tool for PolicySearchTool {
    fn name(&self) -> &str {
        "search_policy_docs"
    }

    fn description(&self) -> &str {
        "Search company policy documents for information about return policy, shipping, refunds, warranty terms, etc."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The question or topic to search for in policy documents"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: Value) -> Result<Value> {
        let query = args["query"].as_str().unwrap_or_default();
        let result = self.rag.answer(query, TOP_K).await?;
        Ok(json!({
            "answer": result.answer,
            "sources": result.sources,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{ModelClient, ModelTurn, ToolDeclaration, TranscriptEntry};
    use crate::rag::KeywordIndex;

    struct CannedModel;

    #[async_trait]
    impl ModelClient for CannedModel {
        async fn converse(
            &self,
            _system_prompt: &str,
            _tools: &[ToolDeclaration],
            _transcript: &[TranscriptEntry],
        ) -> Result<ModelTurn> {
            Ok(ModelTurn::FinalAnswer(
                "Refunds take 5-7 business days [Doc 1].".to_string(),
            ))
        }

        fn name(&self) -> &str {
            "canned"
        }
    }

    #[tokio::test]
    async fn test_policy_search_returns_answer_and_sources() {
        let rag = Arc::new(RagService::new(
            Arc::new(KeywordIndex::with_builtin_docs()),
            Arc::new(CannedModel),
        ));
        let tool = PolicySearchTool::new(rag);
        let result = tool
            .execute(json!({"query": "how long do refunds take"}))
            .await
            .unwrap();
        assert!(result["answer"].as_str().unwrap().contains("5-7"));
        assert!(!result["sources"].as_array().unwrap().is_empty());
    }
}
