//! Span attribute names, following the OpenTelemetry semantic conventions

pub const SYSTEM_NAME: &str = "warehouse";

pub const DB_SYSTEM: &str = "db.system";
pub const DB_OPERATION: &str = "db.operation";

pub const TOOL_NAME: &str = "tool.name";
pub const TOOL_CALL_ID: &str = "tool.call_id";
pub const TOOL_INVOCATION_ID: &str = "tool.invocation_id";
pub const TOOL_CALL_ARGS: &str = "tool.call_args";
pub const TOOL_RESPONSE: &str = "tool.response";
pub const TOOL_SUCCEEDED: &str = "tool.succeeded";
