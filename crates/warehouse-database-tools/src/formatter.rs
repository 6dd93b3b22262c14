//! Renders a schema map as text for agents

use crate::types::SchemaMap;
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::{PrettyFormatter, Serializer};
use warehouse_core::{Result, SchemaFormat};

const MARKDOWN_HEADER: &str = "Here is the database schema:\n\n";
const MARKDOWN_SEPARATOR: &str = "-----------------------------------";

/// Markdown listing of every table and its columns, in map order
pub fn format_markdown(schema: &SchemaMap) -> String {
    let mut out = String::from(MARKDOWN_HEADER);
    for (table, columns) in schema.iter() {
        out.push_str(&format!("### Table: {}\n", table));
        out.push_str(&format!("Columns: {}\n\n", columns.join(", ")));
        out.push_str(MARKDOWN_SEPARATOR);
        out.push_str("\n\n");
    }
    out
}

/// JSON object of table name to column list, indented by four spaces
pub fn format_json(schema: &SchemaMap) -> Result<String> {
    let mut buf = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    schema.serialize(&mut serializer)?;
    // serde_json only ever writes valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

pub fn format_schema(schema: &SchemaMap, format: SchemaFormat) -> Result<String> {
    match format {
        SchemaFormat::Markdown => Ok(format_markdown(schema)),
        SchemaFormat::Json => format_json(schema),
    }
}

/// Formats untyped input, rejecting anything that is not a table to
/// column-list mapping with [`warehouse_core::Error::InvalidSchemaInput`].
pub fn format_value(value: &Value, format: SchemaFormat) -> Result<String> {
    let schema = SchemaMap::try_from(value)?;
    format_schema(&schema, format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use warehouse_core::Error;

    fn sample() -> SchemaMap {
        let mut schema = SchemaMap::new();
        schema.insert("products", vec!["id".into(), "name".into(), "stock".into()]);
        schema.insert("orders", vec!["id".into(), "product_id".into(), "qty".into()]);
        schema
    }

    #[test]
    fn test_markdown_layout() {
        let text = format_markdown(&sample());

        let expected = "Here is the database schema:\n\n\
            ### Table: products\n\
            Columns: id, name, stock\n\n\
            -----------------------------------\n\n\
            ### Table: orders\n\
            Columns: id, product_id, qty\n\n\
            -----------------------------------\n\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_markdown_of_empty_map_is_header_only() {
        assert_eq!(format_markdown(&SchemaMap::new()), MARKDOWN_HEADER);
    }

    #[test]
    fn test_json_indentation_and_order() {
        let text = format_json(&sample()).unwrap();

        assert!(text.starts_with("{\n    \"products\": [\n        \"id\","));
        assert!(text.find("products").unwrap() < text.find("orders").unwrap());

        let parsed: SchemaMap = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, sample());
    }

    #[test]
    fn test_format_schema_dispatch() {
        let schema = sample();
        assert!(format_schema(&schema, SchemaFormat::Markdown)
            .unwrap()
            .contains("### Table: orders"));
        assert!(format_schema(&schema, SchemaFormat::Json)
            .unwrap()
            .contains("\"orders\""));
    }

    #[test]
    fn test_format_value_rejects_non_mappings() {
        let err = format_value(&json!(42), SchemaFormat::Markdown).unwrap_err();
        assert!(matches!(err, Error::InvalidSchemaInput { .. }));

        let err = format_value(&json!("not a dict"), SchemaFormat::Json).unwrap_err();
        assert!(matches!(err, Error::InvalidSchemaInput { .. }));
    }

    #[test]
    fn test_format_value_accepts_mapping() {
        let text = format_value(&json!({"products": ["id", "stock"]}), SchemaFormat::Markdown)
            .unwrap();
        assert!(text.contains("### Table: products"));
        assert!(text.contains("Columns: id, stock"));
    }

    #[test]
    fn test_format_value_keeps_caller_key_order() {
        let value = json!({
            "products": ["id", "stock"],
            "orders": ["id", "qty"],
        });

        let markdown = format_value(&value, SchemaFormat::Markdown).unwrap();
        assert!(markdown.find("products").unwrap() < markdown.find("orders").unwrap());

        let text = format_value(&value, SchemaFormat::Json).unwrap();
        assert!(text.find("products").unwrap() < text.find("orders").unwrap());
    }
}
