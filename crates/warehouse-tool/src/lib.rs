//! Tool plumbing for the warehouse toolkit
//!
//! This crate provides what the agent runtime needs to call into the
//! database layer:
//! - Function tools built from async closures
//! - A JSON schema builder for tool parameters
//! - A default tool context

pub mod context;
pub mod function_tool;
pub mod schema;

// Re-exports
pub use context::DefaultToolContext;
pub use function_tool::{FunctionTool, FunctionToolBuilder};
pub use schema::{ToolSchema, required_str};

// Re-export core types
pub use warehouse_core::{Result, Tool, ToolContext, ToolResponse};
