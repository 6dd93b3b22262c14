use crate::{Result, ToolContext};
use async_trait::async_trait;
use std::sync::Arc;

/// Tool trait - abstraction for agent-callable tools
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the name the agent runtime registers the tool under
    fn name(&self) -> &str;

    /// Returns a description of what the tool does
    fn description(&self) -> &str;

    /// Returns the JSON schema for the tool's parameters
    fn schema(&self) -> serde_json::Value;

    /// Executes the tool with given parameters
    async fn execute(
        &self,
        ctx: Arc<dyn ToolContext>,
        params: serde_json::Value,
    ) -> Result<ToolResponse>;
}

/// Tool execution response
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResponse {
    pub result: serde_json::Value,
}

impl ToolResponse {
    pub fn new(result: serde_json::Value) -> Self {
        Self { result }
    }

    /// Plain-text response, used for the sentinel messages agents read verbatim
    pub fn text(message: impl Into<String>) -> Self {
        Self {
            result: serde_json::Value::String(message.into()),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        self.result.as_str()
    }
}
