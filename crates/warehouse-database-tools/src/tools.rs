//! Agent-facing tools over one database wrapper

use crate::database::Database;
use crate::formatter::format_schema;
use crate::types::{NO_DATA_MESSAGE, NO_TABLES_MESSAGE, QUERY_FAILED_MESSAGE, QueryOutcome, SchemaOutcome};
use std::sync::Arc;
use tokio::sync::Mutex;
use warehouse_core::{Result, SchemaFormat, Tool, ToolResponse, ToolsConfig};
use warehouse_tool::{FunctionTool, ToolSchema, required_str};

pub const EXECUTE_QUERY_TOOL: &str = "warehouse_execute_query";
pub const LIST_TABLES_TOOL: &str = "warehouse_list_tables";
pub const LIST_COLUMNS_TOOL: &str = "warehouse_list_columns";

/// The wrapper shared by every tool of one toolset; the mutex keeps calls one at a time
pub type SharedDatabase = Arc<Mutex<Box<dyn Database>>>;

/// Database tools for an agent, all backed by one connection.
///
/// The connection is opened by [`WarehouseToolset::connect`] and must be
/// released with [`WarehouseToolset::disconnect`] by the owner.
pub struct WarehouseToolset {
    db: SharedDatabase,
    schema_format: SchemaFormat,
}

impl WarehouseToolset {
    /// Connects `db` and wraps it. A failed connection is logged; the tools
    /// then report the missing connection on every call.
    pub async fn connect(mut db: Box<dyn Database>, config: &ToolsConfig) -> Self {
        if !db.connect().await {
            tracing::error!(
                system = db.system(),
                "Warehouse tools created without a database connection"
            );
        }

        Self {
            db: Arc::new(Mutex::new(db)),
            schema_format: config.schema_format,
        }
    }

    pub fn schema_format(&self) -> SchemaFormat {
        self.schema_format
    }

    pub fn database(&self) -> SharedDatabase {
        self.db.clone()
    }

    pub async fn is_connected(&self) -> bool {
        self.db.lock().await.is_connected()
    }

    /// Builds the tools to register with the agent runtime
    pub fn tools(&self) -> Result<Vec<Arc<dyn Tool>>> {
        let mut tools: Vec<Arc<dyn Tool>> = Vec::new();
        tools.push(Arc::new(create_execute_query_tool(self.db.clone())?));
        tools.push(Arc::new(create_list_tables_tool(self.db.clone(), self.schema_format)?));
        tools.push(Arc::new(create_list_columns_tool(self.db.clone())?));
        Ok(tools)
    }

    /// Releases the connection. Safe to call more than once.
    pub async fn disconnect(&self) {
        self.db.lock().await.disconnect().await;
    }
}

/// Create a tool that runs one SQL statement
fn create_execute_query_tool(db: SharedDatabase) -> Result<FunctionTool> {
    let schema = ToolSchema::new()
        .required_string("query", "SQL statement to execute against the warehouse database")
        .build();

    FunctionTool::builder()
        .name(EXECUTE_QUERY_TOOL)
        .description(
            "Execute a SQL statement on the warehouse database and return the resulting rows. \
             Check the tables and columns first.",
        )
        .schema(schema)
        .execute(move |ctx, params| {
            let db = db.clone();
            async move {
                let query = required_str(&params, "query")?;

                tracing::info!(
                    invocation_id = %ctx.invocation_id(),
                    sql = %query,
                    "Executing query"
                );

                let outcome = db.lock().await.execute_query(query).await?;

                Ok(match outcome {
                    QueryOutcome::Rows(rows) => ToolResponse::new(serde_json::json!({
                        "row_count": rows.len(),
                        "rows": rows,
                    })),
                    QueryOutcome::NoData => ToolResponse::text(NO_DATA_MESSAGE),
                    QueryOutcome::Failed => ToolResponse::text(QUERY_FAILED_MESSAGE),
                })
            }
        })
        .build()
}

/// Create a tool that lists every table with its columns
fn create_list_tables_tool(db: SharedDatabase, format: SchemaFormat) -> Result<FunctionTool> {
    FunctionTool::builder()
        .name(LIST_TABLES_TOOL)
        .description(
            "List the tables of the warehouse database with their columns, \
             formatted as markdown or JSON",
        )
        .schema(ToolSchema::new().build())
        .execute(move |ctx, _params| {
            let db = db.clone();
            async move {
                tracing::info!(
                    invocation_id = %ctx.invocation_id(),
                    format = %format,
                    "Getting table columns"
                );

                let outcome = db.lock().await.list_tables_and_columns().await?;

                match outcome {
                    SchemaOutcome::Tables(schema) => {
                        Ok(ToolResponse::text(format_schema(&schema, format)?))
                    }
                    SchemaOutcome::Empty => Ok(ToolResponse::text(NO_TABLES_MESSAGE)),
                    SchemaOutcome::Error(message) => Ok(ToolResponse::text(format!(
                        "Error retrieving database schema: {}",
                        message
                    ))),
                }
            }
        })
        .build()
}

/// Create a tool that lists the columns of one table
fn create_list_columns_tool(db: SharedDatabase) -> Result<FunctionTool> {
    let schema = ToolSchema::new()
        .required_string("table_name", "Name of the table to inspect")
        .build();

    FunctionTool::builder()
        .name(LIST_COLUMNS_TOOL)
        .description("Get the column names of one table in the warehouse database")
        .schema(schema)
        .execute(move |ctx, params| {
            let db = db.clone();
            async move {
                let table_name = required_str(&params, "table_name")?;

                tracing::debug!(
                    invocation_id = %ctx.invocation_id(),
                    table = %table_name,
                    "Getting columns of table"
                );

                let columns = db.lock().await.list_columns(table_name).await?;

                if columns.is_empty() {
                    return Ok(ToolResponse::new(serde_json::json!({})));
                }
                Ok(ToolResponse::new(serde_json::to_value(&columns)?))
            }
        })
        .build()
}
