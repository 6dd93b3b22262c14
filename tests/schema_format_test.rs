//! Formatter behaviour and configuration-driven format selection

use serde_json::json;
use warehouse_core::{Error, SchemaFormat, WarehouseConfig};
use warehouse_database_tools::{SchemaMap, format_json, format_markdown, format_value};

fn warehouse_schema() -> SchemaMap {
    let mut schema = SchemaMap::new();
    schema.insert(
        "products",
        vec!["id".to_string(), "name".to_string(), "stock".to_string()],
    );
    schema.insert(
        "orders",
        vec!["id".to_string(), "product_id".to_string(), "qty".to_string()],
    );
    schema
}

#[test]
fn test_json_round_trips_to_identical_mapping() {
    let schema = warehouse_schema();
    let text = format_json(&schema).unwrap();

    let parsed: SchemaMap = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed, schema);

    let untyped: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(
        untyped,
        json!({
            "products": ["id", "name", "stock"],
            "orders": ["id", "product_id", "qty"],
        })
    );
}

#[test]
fn test_markdown_lists_every_table() {
    let text = format_markdown(&warehouse_schema());

    assert!(text.contains("### Table: products"));
    assert!(text.contains("Columns: id, name, stock"));
    assert!(text.contains("### Table: orders"));
    assert!(text.contains("Columns: id, product_id, qty"));
    // Map order is kept, no sorting
    assert!(text.find("products").unwrap() < text.find("orders").unwrap());
}

#[test]
fn test_non_mapping_input_is_a_type_error() {
    for (input, format) in [
        (json!(42), SchemaFormat::Markdown),
        (json!("not a dict"), SchemaFormat::Json),
        (json!(["products"]), SchemaFormat::Markdown),
        (json!(null), SchemaFormat::Json),
    ] {
        let result = format_value(&input, format);
        assert!(
            matches!(result, Err(Error::InvalidSchemaInput { .. })),
            "{} should be rejected",
            input
        );
    }
}

#[test]
fn test_format_selected_from_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("warehouse.toml");
    std::fs::write(
        &path,
        r#"
            [database]
            name = "northwind"
            user = "northwind_user"

            [tools]
            schema_format = "json"
        "#,
    )
    .unwrap();

    let config = WarehouseConfig::load_from(&path).unwrap();
    assert_eq!(config.tools.schema_format, SchemaFormat::Json);

    let value = serde_json::to_value(warehouse_schema()).unwrap();
    let text = format_value(&value, config.tools.schema_format).unwrap();
    assert!(text.trim_start().starts_with('{'));
}

#[test]
fn test_unknown_format_in_config_is_rejected() {
    let result = WarehouseConfig::from_toml_str(
        r#"
            [database]
            name = "northwind"
            user = "northwind_user"

            [tools]
            schema_format = "yaml"
        "#,
    );
    assert!(result.is_err());
}
