//! SQLite backend

use crate::database::Database;
use crate::types::{QueryOutcome, Row, SchemaMap, SchemaOutcome, TableColumns};
use crate::value::{bytes_to_hex, unsupported};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqliteRow};
use sqlx::{Connection, Executor, Row as _, Sqlite, Transaction, TypeInfo, ValueRef};
use std::str::FromStr;
use tracing::Instrument;
use warehouse_core::{Error, Result};
use warehouse_telemetry::database_span;

const SYSTEM: &str = "sqlite";

pub const IN_MEMORY_URL: &str = "sqlite::memory:";

/// One row per (table or view, column) in creation order; internal `sqlite_%` tables skipped
const SCHEMA_MAP_QUERY: &str = r#"
    SELECT m.name AS table_name, p.name AS column_name
    FROM sqlite_master AS m
    JOIN pragma_table_info(m.name) AS p
    WHERE m.type IN ('table', 'view')
    AND m.name NOT LIKE 'sqlite_%'
    ORDER BY m.rowid, p.cid
"#;

const TABLE_COLUMNS_QUERY: &str = "SELECT name FROM pragma_table_info(?1) ORDER BY cid";

/// Wrapper around a single SQLite connection
pub struct SqliteDatabase {
    url: String,
    connection: Option<SqliteConnection>,
}

impl SqliteDatabase {
    /// Creates a disconnected wrapper for `url` (`sqlite://path.db`, `sqlite::memory:`).
    /// File databases are created on first connect.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            connection: None,
        }
    }

    /// A private in-memory database; its contents vanish on disconnect
    pub fn in_memory() -> Self {
        Self::new(IN_MEMORY_URL)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn connection(&mut self) -> Result<&mut SqliteConnection> {
        self.connection.as_mut().ok_or(Error::NotConnected)
    }
}

#[async_trait]
impl Database for SqliteDatabase {
    fn system(&self) -> &'static str {
        SYSTEM
    }

    fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    async fn connect(&mut self) -> bool {
        let span = database_span(SYSTEM, "connect");
        async move {
            if self.connection.is_some() {
                tracing::debug!("SQLite connection already open");
                return true;
            }

            let options = match SqliteConnectOptions::from_str(&self.url) {
                Ok(options) => options.create_if_missing(true),
                Err(e) => {
                    tracing::error!(url = %self.url, error = %e, "Invalid SQLite URL");
                    return false;
                }
            };

            match SqliteConnection::connect_with(&options).await {
                Ok(conn) => {
                    tracing::info!(url = %self.url, "Connected to SQLite");
                    self.connection = Some(conn);
                    true
                }
                Err(e) => {
                    tracing::error!(url = %self.url, error = %e, "Failed to connect to SQLite");
                    false
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn disconnect(&mut self) {
        let span = database_span(SYSTEM, "disconnect");
        async move {
            let Some(conn) = self.connection.take() else {
                return;
            };

            match conn.close().await {
                Ok(()) => tracing::info!("SQLite connection closed"),
                Err(e) => tracing::warn!(error = %e, "Error while closing SQLite connection"),
            }
        }
        .instrument(span)
        .await
    }

    async fn execute_query(&mut self, sql: &str) -> Result<QueryOutcome> {
        let span = database_span(SYSTEM, "execute_query");
        async move {
            let conn = self.connection()?;
            tracing::debug!(sql = %sql, "Executing SQLite query");

            let mut tx = match conn.begin().await {
                Ok(tx) => tx,
                Err(e) => {
                    tracing::error!(error = %e, "Could not open transaction");
                    return Ok(QueryOutcome::Failed);
                }
            };

            // Unprepared, so several statements may be sent at once
            let rows = match (&mut *tx).fetch_all(sqlx::raw_sql(sql)).await {
                Ok(rows) => rows,
                Err(e) => {
                    tracing::error!(sql = %sql, error = %e, "Error while executing query");
                    rollback(tx).await;
                    return Ok(QueryOutcome::Failed);
                }
            };

            if let Err(e) = tx.commit().await {
                tracing::error!(sql = %sql, error = %e, "Error while committing query");
                return Ok(QueryOutcome::Failed);
            }

            if rows.is_empty() {
                tracing::info!("Query returned no rows");
                return Ok(QueryOutcome::NoData);
            }

            let rows: Vec<Row> = rows.iter().map(decode_row).collect();
            tracing::info!(row_count = rows.len(), "Query returned rows");
            Ok(QueryOutcome::Rows(rows))
        }
        .instrument(span)
        .await
    }

    async fn list_tables_and_columns(&mut self) -> Result<SchemaOutcome> {
        let span = database_span(SYSTEM, "list_tables_and_columns");
        async move {
            let conn = self.connection()?;

            let mut tx = match conn.begin().await {
                Ok(tx) => tx,
                Err(e) => {
                    tracing::error!(error = %e, "Could not open transaction");
                    return Ok(SchemaOutcome::Error(e.to_string()));
                }
            };

            let collected = match sqlx::query(SCHEMA_MAP_QUERY).fetch_all(&mut *tx).await {
                Ok(rows) => collect_schema(&rows),
                Err(e) => Err(e),
            };

            let schema = match collected {
                Ok(schema) => schema,
                Err(e) => {
                    tracing::error!(error = %e, "Error while getting tables and columns");
                    rollback(tx).await;
                    return Ok(SchemaOutcome::Error(e.to_string()));
                }
            };

            if let Err(e) = tx.commit().await {
                tracing::error!(error = %e, "Error while committing catalog query");
                return Ok(SchemaOutcome::Error(e.to_string()));
            }

            if schema.is_empty() {
                tracing::info!("No tables found in the database");
                return Ok(SchemaOutcome::Empty);
            }

            tracing::info!(table_count = schema.len(), "Read database schema");
            Ok(SchemaOutcome::Tables(schema))
        }
        .instrument(span)
        .await
    }

    async fn list_columns(&mut self, table_name: &str) -> Result<TableColumns> {
        let span = database_span(SYSTEM, "list_columns");
        async move {
            let conn = self.connection()?;

            let mut tx = match conn.begin().await {
                Ok(tx) => tx,
                Err(e) => {
                    tracing::error!(table = %table_name, error = %e, "Could not open transaction");
                    return Ok(TableColumns::new(table_name, Vec::new()));
                }
            };

            let fetched = sqlx::query(TABLE_COLUMNS_QUERY)
                .bind(table_name)
                .fetch_all(&mut *tx)
                .await
                .and_then(|rows| {
                    rows.iter()
                        .map(|row| row.try_get::<String, _>("name"))
                        .collect::<std::result::Result<Vec<_>, _>>()
                });

            match fetched {
                Ok(columns) => {
                    if let Err(e) = tx.commit().await {
                        tracing::error!(table = %table_name, error = %e, "Error while committing catalog query");
                        return Ok(TableColumns::new(table_name, Vec::new()));
                    }
                    tracing::debug!(table = %table_name, column_count = columns.len(), "Read table columns");
                    Ok(TableColumns::new(table_name, columns))
                }
                Err(e) => {
                    tracing::error!(table = %table_name, error = %e, "Error while getting columns for table");
                    rollback(tx).await;
                    Ok(TableColumns::new(table_name, Vec::new()))
                }
            }
        }
        .instrument(span)
        .await
    }
}

impl Drop for SqliteDatabase {
    fn drop(&mut self) {
        if self.connection.is_some() {
            tracing::warn!(url = %self.url, "SQLite wrapper dropped without disconnect()");
        }
    }
}

async fn rollback(tx: Transaction<'_, Sqlite>) {
    if let Err(e) = tx.rollback().await {
        tracing::warn!(error = %e, "Rollback failed");
    }
}

fn collect_schema(rows: &[SqliteRow]) -> std::result::Result<SchemaMap, sqlx::Error> {
    let mut schema = SchemaMap::new();
    for row in rows {
        let table: String = row.try_get("table_name")?;
        let column: String = row.try_get("column_name")?;
        schema.push_column(&table, column);
    }
    Ok(schema)
}

fn decode_row(row: &SqliteRow) -> Row {
    (0..row.len()).map(|i| decode_value(row, i)).collect()
}

/// Converts one value to JSON by the storage class of the value itself, not the declared column type
fn decode_value(row: &SqliteRow, index: usize) -> Value {
    let type_name = match row.try_get_raw(index) {
        Ok(raw) if raw.is_null() => return Value::Null,
        Ok(raw) => raw.type_info().name().to_string(),
        Err(_) => return Value::Null,
    };

    let decoded = match type_name.as_str() {
        "INTEGER" | "BOOLEAN" => row.try_get::<i64, _>(index).map(Value::from),
        "REAL" | "NUMERIC" => row.try_get::<f64, _>(index).map(Value::from),
        "BLOB" => row.try_get::<Vec<u8>, _>(index).map(|b| bytes_to_hex(&b)),
        _ => row.try_get::<String, _>(index).map(Value::String),
    };
    if let Ok(value) = decoded {
        return value;
    }

    // Storage class name not recognised: take the first type that decodes
    if let Ok(v) = row.try_get::<i64, _>(index) {
        return Value::from(v);
    }
    if let Ok(v) = row.try_get::<f64, _>(index) {
        return Value::from(v);
    }
    if let Ok(v) = row.try_get::<Vec<u8>, _>(index) {
        return bytes_to_hex(&v);
    }

    tracing::debug!(column = index, sql_type = %type_name, "Value has no JSON rendering");
    unsupported(&type_name)
}
