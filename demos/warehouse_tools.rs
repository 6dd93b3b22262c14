//! Connects the warehouse tools to the configured PostgreSQL database and
//! calls each tool once, the way an agent runtime would.
//!
//! Configure via warehouse.toml or WAREHOUSE_DB_* variables, then:
//! cargo run --example warehouse_tools -- "SELECT product_name, units_in_stock FROM products LIMIT 5"

use std::sync::Arc;
use warehouse_core::{Tool, WarehouseConfig};
use warehouse_database_tools::{PostgresDatabase, WarehouseToolset, tools};
use warehouse_tool::DefaultToolContext;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = WarehouseConfig::load()?;
    warehouse_telemetry::init_logging(&config.logging);

    println!("Connecting to {}", config.database.target());
    let toolset = WarehouseToolset::connect(
        Box::new(PostgresDatabase::new(config.database.clone())),
        &config.tools,
    )
    .await;

    let result = run(&toolset).await;

    // Release the connection on every path
    toolset.disconnect().await;
    result
}

async fn run(toolset: &WarehouseToolset) -> anyhow::Result<()> {
    let mut tool_list = toolset.tools()?;
    tool_list.extend(warehouse_file_tools::file_tools()?);
    println!(
        "Registered tools: {}",
        tool_list.iter().map(|t| t.name()).collect::<Vec<_>>().join(", ")
    );

    let tool = |name: &str| -> anyhow::Result<Arc<dyn Tool>> {
        tool_list
            .iter()
            .find(|t| t.name() == name)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("tool {} missing", name))
    };

    let schema = tool(tools::LIST_TABLES_TOOL)?
        .execute(Arc::new(DefaultToolContext::generate()), serde_json::json!({}))
        .await?;
    println!("{}", schema.as_text().unwrap_or_default());

    if let Some(sql) = std::env::args().nth(1) {
        let rows = tool(tools::EXECUTE_QUERY_TOOL)?
            .execute(
                Arc::new(DefaultToolContext::generate()),
                serde_json::json!({ "query": sql }),
            )
            .await?;
        println!("{}", serde_json::to_string_pretty(&rows.result)?);
    }

    Ok(())
}
