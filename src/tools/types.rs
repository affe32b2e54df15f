//! Tool trait.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::providers::ToolDeclaration;

/// A deterministic capability the model can invoke by name.
///
/// Tools take a JSON arguments object (already validated against
/// `parameters()` by the registry) and return a JSON result that is fed back
/// into the transcript verbatim.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON Schema for the arguments object.
    fn parameters(&self) -> Value;

    async fn execute(&self, args: Value) -> Result<Value>;

    fn declaration(&self) -> ToolDeclaration {
        ToolDeclaration {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }
}
