//! Logging and span helpers for the warehouse toolkit

pub mod attributes;
pub mod logging;
pub mod spans;

pub use logging::{build_filter, init_logging};
pub use spans::{
    ToolSpanAttributes, database_span, safe_serialize, safe_serialize_pretty, trace_tool_call,
};
