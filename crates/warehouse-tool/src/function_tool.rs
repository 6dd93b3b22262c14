use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use warehouse_core::{Error, Result, Tool, ToolContext, ToolResponse};
use warehouse_telemetry::{ToolSpanAttributes, safe_serialize, trace_tool_call};

/// Type alias for tool execution function
pub type ToolFn = Box<
    dyn Fn(Arc<dyn ToolContext>, Value) -> Pin<Box<dyn Future<Output = Result<ToolResponse>> + Send>>
        + Send
        + Sync,
>;

/// A tool whose behaviour is an async closure
pub struct FunctionTool {
    name: String,
    description: String,
    schema: Value,
    execute_fn: ToolFn,
}

impl FunctionTool {
    pub fn builder() -> FunctionToolBuilder {
        FunctionToolBuilder::new()
    }
}

impl std::fmt::Debug for FunctionTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionTool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("schema", &self.schema)
            .finish()
    }
}

#[async_trait]
impl Tool for FunctionTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn schema(&self) -> Value {
        self.schema.clone()
    }

    async fn execute(&self, ctx: Arc<dyn ToolContext>, params: Value) -> Result<ToolResponse> {
        let tool_call_id = ctx.function_call_id().to_string();
        let invocation_id = ctx.invocation_id().to_string();
        let args_json = safe_serialize(&params);

        let result = (self.execute_fn)(ctx, params).await;

        trace_tool_call(ToolSpanAttributes {
            tool_name: self.name.clone(),
            tool_call_id,
            invocation_id,
            args_json,
            response_json: match &result {
                Ok(response) => safe_serialize(&response.result),
                Err(e) => e.to_string(),
            },
            succeeded: result.is_ok(),
        });

        result
    }
}

/// Builder for FunctionTool
#[derive(Default)]
pub struct FunctionToolBuilder {
    name: Option<String>,
    description: Option<String>,
    schema: Option<Value>,
    execute_fn: Option<ToolFn>,
}

impl FunctionToolBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn execute<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Arc<dyn ToolContext>, Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ToolResponse>> + Send + 'static,
    {
        self.execute_fn = Some(Box::new(move |ctx, params| Box::pin(f(ctx, params))));
        self
    }

    pub fn build(self) -> Result<FunctionTool> {
        let name = self
            .name
            .ok_or_else(|| Error::message("Tool name is required"))?;

        // Agent runtimes register tools as function names
        let valid_name = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');
        if !valid_name {
            return Err(Error::message(format!(
                "Tool name '{}' must be non-empty snake_case",
                name
            )));
        }

        Ok(FunctionTool {
            name,
            description: self
                .description
                .ok_or_else(|| Error::message("Tool description is required"))?,
            schema: self.schema.unwrap_or_else(|| crate::ToolSchema::new().build()),
            execute_fn: self
                .execute_fn
                .ok_or_else(|| Error::message("Tool execute function is required"))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::DefaultToolContext;
    use crate::schema::{ToolSchema, required_str};

    fn shout_tool() -> FunctionTool {
        FunctionTool::builder()
            .name("shout")
            .description("Upper-cases a word")
            .schema(ToolSchema::new().required_string("word", "Word to shout").build())
            .execute(|_ctx, params| async move {
                let word = required_str(&params, "word")?;
                Ok(ToolResponse::text(word.to_uppercase()))
            })
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_function_tool_execution() {
        let tool = shout_tool();

        assert_eq!(tool.name(), "shout");
        assert_eq!(tool.description(), "Upper-cases a word");
        assert_eq!(tool.schema()["required"], serde_json::json!(["word"]));

        let ctx = Arc::new(DefaultToolContext::new("call-1", "inv-1"));
        let response = tool
            .execute(ctx, serde_json::json!({"word": "stock"}))
            .await
            .unwrap();

        assert_eq!(response.as_text(), Some("STOCK"));
    }

    #[tokio::test]
    async fn test_function_tool_propagates_param_errors() {
        let tool = shout_tool();
        let ctx = Arc::new(DefaultToolContext::generate());

        let err = tool.execute(ctx, serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, Error::InvalidParams(_)));
    }

    #[test]
    fn test_builder_requires_fields() {
        let missing_fn = FunctionTool::builder()
            .name("orphan")
            .description("No body")
            .build();
        assert!(missing_fn.is_err());

        let bad_name = FunctionTool::builder()
            .name("Bad Name")
            .description("Spaces are not allowed")
            .execute(|_ctx, _params| async { Ok(ToolResponse::text("ok")) })
            .build();
        assert!(bad_name.is_err());
    }

    #[test]
    fn test_default_schema_is_empty_object() {
        let tool = FunctionTool::builder()
            .name("ping")
            .description("Replies with pong")
            .execute(|_ctx, _params| async { Ok(ToolResponse::text("pong")) })
            .build()
            .unwrap();

        assert_eq!(tool.schema()["type"], "object");
    }
}
