//! Agent-facing file tools

use crate::readers::{read_csv, read_json, read_txt};
use std::sync::Arc;
use warehouse_core::{Result, Tool, ToolResponse};
use warehouse_tool::{FunctionTool, ToolSchema, required_str};

pub const READ_CSV_TOOL: &str = "read_csv_file";
pub const READ_JSON_TOOL: &str = "read_json_file";
pub const READ_TXT_TOOL: &str = "read_txt_file";

/// Builds the file tools to register with the agent runtime
pub fn file_tools() -> Result<Vec<Arc<dyn Tool>>> {
    let mut tools: Vec<Arc<dyn Tool>> = Vec::new();
    tools.push(Arc::new(create_read_csv_tool()?));
    tools.push(Arc::new(create_read_json_tool()?));
    tools.push(Arc::new(create_read_txt_tool()?));
    Ok(tools)
}

fn file_path_schema() -> serde_json::Value {
    ToolSchema::new()
        .required_string("file_path", "Path of the file on the local filesystem")
        .build()
}

fn read_error(kind: &str, path: &str, error: &warehouse_core::Error) -> ToolResponse {
    tracing::error!(path = %path, error = %error, "Error reading {} file", kind);
    ToolResponse::text(format!("Error reading {} file '{}': {}", kind, path, error))
}

/// Create a tool that reads a CSV file into headers and rows
fn create_read_csv_tool() -> Result<FunctionTool> {
    FunctionTool::builder()
        .name(READ_CSV_TOOL)
        .description("Read a CSV file and return its header and rows")
        .schema(file_path_schema())
        .execute(|ctx, params| async move {
            let path = required_str(&params, "file_path")?;
            tracing::info!(invocation_id = %ctx.invocation_id(), path = %path, "Reading CSV file");

            Ok(match read_csv(path).await {
                Ok(content) => ToolResponse::new(serde_json::json!({
                    "headers": content.headers,
                    "row_count": content.rows.len(),
                    "rows": content.rows,
                })),
                Err(e) => read_error("CSV", path, &e),
            })
        })
        .build()
}

/// Create a tool that reads and parses a JSON file
fn create_read_json_tool() -> Result<FunctionTool> {
    FunctionTool::builder()
        .name(READ_JSON_TOOL)
        .description("Read a JSON file and return its content")
        .schema(file_path_schema())
        .execute(|ctx, params| async move {
            let path = required_str(&params, "file_path")?;
            tracing::info!(invocation_id = %ctx.invocation_id(), path = %path, "Reading JSON file");

            Ok(match read_json(path).await {
                Ok(value) => ToolResponse::new(value),
                Err(e) => read_error("JSON", path, &e),
            })
        })
        .build()
}

/// Create a tool that reads a plain-text file
fn create_read_txt_tool() -> Result<FunctionTool> {
    FunctionTool::builder()
        .name(READ_TXT_TOOL)
        .description("Read a text file and return its content")
        .schema(file_path_schema())
        .execute(|ctx, params| async move {
            let path = required_str(&params, "file_path")?;
            tracing::info!(invocation_id = %ctx.invocation_id(), path = %path, "Reading TXT file");

            Ok(match read_txt(path).await {
                Ok(text) => ToolResponse::text(text),
                Err(e) => read_error("TXT", path, &e),
            })
        })
        .build()
}
