//! Result types returned by the database wrapper

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use warehouse_core::{Error, Result};

/// Sentinel text for a statement that produced no rows
pub const NO_DATA_MESSAGE: &str = "No data found.";
/// Sentinel text for a statement the database rejected
pub const QUERY_FAILED_MESSAGE: &str = "Database query failed.";
/// Sentinel text for a database without user tables
pub const NO_TABLES_MESSAGE: &str = "No tables found in the database.";

/// One result row, values in column order
pub type Row = Vec<Value>;

/// Outcome of `execute_query`
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// At least one row came back
    Rows(Vec<Row>),
    /// The statement succeeded and returned zero rows
    NoData,
    /// The statement failed and its transaction was rolled back
    Failed,
}

impl QueryOutcome {
    pub fn rows(&self) -> Option<&[Row]> {
        match self {
            QueryOutcome::Rows(rows) => Some(rows),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, QueryOutcome::Failed)
    }
}

/// Outcome of `list_tables_and_columns`
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaOutcome {
    Tables(SchemaMap),
    /// The catalog lists no user tables
    Empty,
    /// The catalog query failed; carries the database message
    Error(String),
}

impl SchemaOutcome {
    pub fn tables(&self) -> Option<&SchemaMap> {
        match self {
            SchemaOutcome::Tables(map) => Some(map),
            _ => None,
        }
    }
}

/// Columns of a single table.
///
/// `columns` is empty when the table does not exist, has no columns, or the
/// catalog query failed; the three cases are not told apart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableColumns {
    pub table_name: String,
    pub columns: Vec<String>,
}

impl TableColumns {
    pub fn new(table_name: impl Into<String>, columns: Vec<String>) -> Self {
        Self {
            table_name: table_name.into(),
            columns,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Table name to column names, in the order the catalog produced them.
///
/// Serializes as a JSON object whose keys keep that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaMap {
    tables: Vec<TableColumns>,
}

impl SchemaMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the columns of `table`, replacing them if the table is already present
    pub fn insert(&mut self, table: impl Into<String>, columns: Vec<String>) {
        let table = table.into();
        match self.tables.iter_mut().find(|t| t.table_name == table) {
            Some(existing) => existing.columns = columns,
            None => self.tables.push(TableColumns::new(table, columns)),
        }
    }

    /// Appends one column, creating the table entry on first sight
    pub fn push_column(&mut self, table: &str, column: impl Into<String>) {
        match self.tables.iter_mut().find(|t| t.table_name == table) {
            Some(existing) => existing.columns.push(column.into()),
            None => self
                .tables
                .push(TableColumns::new(table, vec![column.into()])),
        }
    }

    pub fn get(&self, table: &str) -> Option<&[String]> {
        self.tables
            .iter()
            .find(|t| t.table_name == table)
            .map(|t| t.columns.as_slice())
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.tables
            .iter()
            .map(|t| (t.table_name.as_str(), t.columns.as_slice()))
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|t| t.table_name.as_str())
    }
}

impl FromIterator<(String, Vec<String>)> for SchemaMap {
    fn from_iter<I: IntoIterator<Item = (String, Vec<String>)>>(iter: I) -> Self {
        let mut map = SchemaMap::new();
        for (table, columns) in iter {
            map.insert(table, columns);
        }
        map
    }
}

impl Serialize for SchemaMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.tables.len()))?;
        for table in &self.tables {
            map.serialize_entry(&table.table_name, &table.columns)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SchemaMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct SchemaMapVisitor;

        impl<'de> Visitor<'de> for SchemaMapVisitor {
            type Value = SchemaMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping of table names to column lists")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<SchemaMap, A::Error> {
                let mut map = SchemaMap::new();
                while let Some((table, columns)) = access.next_entry::<String, Vec<String>>()? {
                    map.insert(table, columns);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(SchemaMapVisitor)
    }
}

impl TryFrom<&Value> for SchemaMap {
    type Error = Error;

    /// Accepts only a JSON object whose values are arrays of strings
    fn try_from(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| Error::invalid_schema_input(describe(value)))?;

        let mut map = SchemaMap::new();
        for (table, columns) in object {
            let columns = columns.as_array().ok_or_else(|| {
                Error::invalid_schema_input(format!(
                    "{} for table '{}'",
                    describe(columns),
                    table
                ))
            })?;

            let names = columns
                .iter()
                .map(|c| {
                    c.as_str().map(str::to_string).ok_or_else(|| {
                        Error::invalid_schema_input(format!(
                            "{} in the columns of table '{}'",
                            describe(c),
                            table
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()?;

            map.insert(table.clone(), names);
        }
        Ok(map)
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "a boolean".to_string(),
        Value::Number(n) => format!("a number ({})", n),
        Value::String(_) => "a string".to_string(),
        Value::Array(_) => "an array".to_string(),
        Value::Object(_) => "an object".to_string(),
    }
}
